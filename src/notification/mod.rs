//! 通知层 - 渲染告警并通过渠道发送
//!
//! 所有渠道实现 `NotificationChannel`；`NotificationDispatcher` 实现
//! `Notifier`，发送失败只记录日志，不影响监控循环。
//!
//! # 使用示例
//! ```ignore
//! use bamboo_monitor::notification::{NotificationDispatcher, Notifier};
//!
//! let dispatcher = NotificationDispatcher::from_config(&config.alert, clock)?;
//! dispatcher.send("✅ Bamboo is UP");
//! ```

pub mod channel;
pub mod channels;
pub mod dispatcher;
pub mod formatter;

pub use channel::{NotificationChannel, Notifier, SendResult};
pub use channels::TwilioChannel;
pub use dispatcher::NotificationDispatcher;
pub use formatter::render;
