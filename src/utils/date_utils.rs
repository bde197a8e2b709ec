use chrono::{Duration, Utc};
use chrono_tz::Asia::Seoul;

// 所有日期/时间字符串均以韩国交易所时区（Asia/Seoul）为准

/// 今日日期，格式 "YYYYMMDD"
pub fn today_string() -> String {
    Utc::now().with_timezone(&Seoul).format("%Y%m%d").to_string()
}

/// 昨日日期，格式 "YYYYMMDD"
pub fn yesterday_string() -> String {
    day_string(1)
}

/// 今日往前推 `days_ago` 天的日期，格式 "YYYYMMDD"
pub fn day_string(days_ago: i64) -> String {
    (Utc::now().with_timezone(&Seoul) - Duration::days(days_ago))
        .format("%Y%m%d")
        .to_string()
}

/// 当前时刻，格式 "HHMMSS"
pub fn time_string() -> String {
    Utc::now().with_timezone(&Seoul).format("%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format() {
        let today = today_string();
        assert_eq!(today.len(), 8);
        assert!(today.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_day_string_offsets() {
        assert_eq!(day_string(0), today_string());
        // dates further in the past sort lexicographically smaller
        assert!(day_string(100) < day_string(99));
        assert_eq!(yesterday_string(), day_string(1));
    }

    #[test]
    fn test_time_format() {
        let time = time_string();
        assert_eq!(time.len(), 6);
        assert!(time.chars().all(|c| c.is_ascii_digit()));
    }
}
