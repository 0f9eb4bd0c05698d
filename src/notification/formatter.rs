//! 告警消息格式化

use crate::clock::format_timestamp;
use crate::watcher::TransitionEvent;
use chrono::{DateTime, Local};

/// 渲染状态转换告警
pub fn render(event: TransitionEvent, target_url: &str, at: &DateTime<Local>) -> String {
    let headline = match event {
        TransitionEvent::Up => "✅ Bamboo is UP",
        TransitionEvent::Down => "❌ Bamboo appears DOWN",
    };
    format!("{}\nURL: {}\nTime: {}", headline, target_url, format_timestamp(at))
}
