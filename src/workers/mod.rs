pub mod buy_task;
pub mod sell_task;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// 按股票的建议锁。
///
/// 买卖两个 tick 对同一只股票的处理绝不交错：先到者拿锁，
/// 后到者直接放弃本轮（不排队）。锁本身只在进出集合的瞬间持有。
#[derive(Clone, Default)]
pub struct TickerLocks {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl TickerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 拿不到就返回 None，调用方应放弃本轮处理
    pub fn try_acquire(&self, code: &str) -> Option<TickerGuard> {
        let mut held = self.inner.lock().expect("ticker lock poisoned");
        if held.contains(code) {
            return None;
        }
        held.insert(code.to_string());
        Some(TickerGuard {
            locks: self.inner.clone(),
            code: code.to_string(),
        })
    }
}

pub struct TickerGuard {
    locks: Arc<Mutex<HashSet<String>>>,
    code: String,
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.locks.lock() {
            held.remove(&self.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_drops() {
        let locks = TickerLocks::new();
        let guard = locks.try_acquire("005930");
        assert!(guard.is_some());
        assert!(locks.try_acquire("005930").is_none());
        // a different ticker is unaffected
        assert!(locks.try_acquire("035720").is_some());
    }

    #[test]
    fn test_release_on_drop() {
        let locks = TickerLocks::new();
        {
            let _guard = locks.try_acquire("005930").unwrap();
        }
        assert!(locks.try_acquire("005930").is_some());
    }
}
