//! Time source and sleeping, injectable so loops can be driven in tests

use chrono::{DateTime, Local};
use std::time::Duration;

/// Time source used by the monitor loop and delivery polling
pub trait Clock: Send + Sync {
    /// Current wall-clock time, used in alert messages
    fn now(&self) -> DateTime<Local>;

    /// Block the current thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Real clock backed by `chrono::Local` and `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// 格式化时间戳（用于通知内容）
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}
