//! 通知分发器 - 管理渠道并路由消息

use super::channel::{NotificationChannel, Notifier, SendResult};
use super::channels::TwilioChannel;
use crate::clock::Clock;
use crate::config::AlertConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// 通知分发器
pub struct NotificationDispatcher {
    /// 所有注册的渠道
    channels: Vec<Arc<dyn NotificationChannel>>,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl NotificationDispatcher {
    /// 创建新的分发器
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 根据告警配置构建分发器
    ///
    /// Twilio 凭据不完整时不注册渠道，每次发送都会记录警告。
    pub fn from_config(config: &AlertConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut dispatcher = Self::new();

        match config.twilio.credentials() {
            Some(credentials) => {
                let channel = TwilioChannel::new(
                    config.channel,
                    credentials,
                    config.twilio.status_polls,
                    config.twilio.status_poll_interval,
                    clock,
                )?;
                dispatcher.register_channel(Arc::new(channel));
            }
            None => {
                warn!(
                    channel = %config.channel,
                    "Twilio credentials incomplete; alerts will be logged but not sent"
                );
            }
        }

        Ok(dispatcher)
    }

    /// 注册渠道
    pub fn register_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        info!(channel = channel.name(), "Registering notification channel");
        self.channels.push(channel);
    }

    /// 同步发送消息到所有渠道，返回每个渠道的结果
    pub fn send_all(&self, message: &str) -> Vec<(String, SendResult)> {
        let mut results = Vec::new();

        for channel in &self.channels {
            let name = channel.name().to_string();

            if self.dry_run {
                info!(channel = %name, message = %message, "[DRY-RUN] Would send alert");
                results.push((name, SendResult::Skipped("dry-run".to_string())));
                continue;
            }

            let result = match channel.send(message) {
                Ok(r) => r,
                Err(e) => {
                    warn!(channel = %name, error = %e, "Channel send failed");
                    SendResult::Failed(e.to_string())
                }
            };

            results.push((name, result));
        }

        results
    }

    /// 获取已注册的渠道数量
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 获取已注册的渠道名称
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NotificationDispatcher {
    fn send(&self, message: &str) {
        if self.channels.is_empty() {
            warn!(message = %message, "No notification channel configured; alert not sent");
            return;
        }

        for (channel, result) in self.send_all(message) {
            match result {
                SendResult::Sent => info!(channel = %channel, "Alert delivered to channel"),
                SendResult::Skipped(reason) => info!(channel = %channel, reason = %reason, "Alert skipped"),
                SendResult::Failed(reason) => warn!(channel = %channel, reason = %reason, "Alert not sent"),
            }
        }
    }
}
