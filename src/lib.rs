//! Bamboo Monitor - 监控 Bamboo 构建服务器可用性，并在状态变化时告警

pub mod cli;
pub mod clock;
pub mod config;
pub mod notification;
pub mod probe;
pub mod watcher;

pub use clock::{Clock, SystemClock};
pub use config::{AlertChannel, Auth, MonitorConfig, ProbeConfig};
pub use notification::{NotificationChannel, NotificationDispatcher, Notifier, SendResult, TwilioChannel};
pub use probe::{HttpProber, Prober};
pub use watcher::{Monitor, MonitorState, Observation, Status, Thresholds, TransitionEvent};
