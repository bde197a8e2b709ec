use bigdecimal::BigDecimal;
use serde_json::Value;
use std::str::FromStr;

/// 券商返回的数字字段很不规范：可能是字符串、可能带逗号或货币符号、也可能缺失。
/// 统一做法：剔除数字(0-9)、小数点(.)、负号(-)以外的所有字符后再解析，
/// 任何一步失败都返回 0。
fn sanitize(v: Option<&Value>) -> String {
    let raw = match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect()
}

// 校验是否形如 "-?\d+(\.\d+)?"，过滤空串、"."、"-." 之类的清洗残留
fn is_valid_number(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    let mut parts = body.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();
    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match frac_part {
        None => true,
        Some(f) => !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()),
    }
}

pub fn conv_i32(v: Option<&Value>) -> i32 {
    let s = sanitize(v);
    if !is_valid_number(&s) {
        return 0;
    }
    // 带小数点的值在整数解析时失败，落回 0
    s.parse::<i32>().unwrap_or(0)
}

pub fn conv_i64(v: Option<&Value>) -> i64 {
    let s = sanitize(v);
    if !is_valid_number(&s) {
        return 0;
    }
    s.parse::<i64>().unwrap_or(0)
}

pub fn conv_f64(v: Option<&Value>) -> f64 {
    let s = sanitize(v);
    if !is_valid_number(&s) {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(0.0)
}

pub fn conv_bigdecimal(v: Option<&Value>) -> BigDecimal {
    let s = sanitize(v);
    if !is_valid_number(&s) {
        return BigDecimal::from(0);
    }
    BigDecimal::from_str(&s).unwrap_or_else(|_| BigDecimal::from(0))
}

pub fn conv_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conv_i32_plain() {
        assert_eq!(conv_i32(Some(&json!("8750"))), 8750);
        assert_eq!(conv_i32(Some(&json!(8750))), 8750);
        assert_eq!(conv_i32(Some(&json!("-120"))), -120);
    }

    #[test]
    fn test_conv_i32_dirty() {
        assert_eq!(conv_i32(Some(&json!("1,234"))), 1234);
        assert_eq!(conv_i32(Some(&json!("₩5,000"))), 5000);
        assert_eq!(conv_i32(Some(&json!(""))), 0);
        assert_eq!(conv_i32(Some(&json!("abc"))), 0);
        assert_eq!(conv_i32(None), 0);
        // decimal strings fall back to 0 for integer conversion
        assert_eq!(conv_i32(Some(&json!("123.45"))), 0);
    }

    #[test]
    fn test_conv_f64() {
        assert_eq!(conv_f64(Some(&json!("12.5"))), 12.5);
        assert_eq!(conv_f64(Some(&json!("-3.25%"))), -3.25);
        assert_eq!(conv_f64(Some(&json!(null))), 0.0);
        assert_eq!(conv_f64(Some(&json!("."))), 0.0);
        assert_eq!(conv_f64(Some(&json!("-."))), 0.0);
    }

    #[test]
    fn test_conv_bigdecimal() {
        assert_eq!(
            conv_bigdecimal(Some(&json!("1,234.56"))),
            BigDecimal::from_str("1234.56").unwrap()
        );
        assert_eq!(conv_bigdecimal(Some(&json!("n/a"))), BigDecimal::from(0));
        assert_eq!(conv_bigdecimal(None), BigDecimal::from(0));
    }

    #[test]
    fn test_conv_i64_large() {
        assert_eq!(conv_i64(Some(&json!("9876543210"))), 9_876_543_210);
    }
}
