//! Twilio 渠道 - 通过 Twilio REST API 发送 WhatsApp 或短信
//!
//! 发送后可选地轮询消息状态，仅用于日志诊断：遇到终态
//! (`delivered` / `undelivered` / `failed`) 或达到轮询次数即停止。

use crate::clock::Clock;
use crate::config::{AlertChannel, TwilioCredentials};
use crate::notification::channel::{NotificationChannel, SendResult};
use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Twilio API 基础 URL
pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// 请求超时（秒）
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// 消息资源（创建和查询共用）
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
}

/// API 错误响应
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// 投递状态是否为终态
pub fn is_terminal_status(status: &str) -> bool {
    matches!(status, "delivered" | "undelivered" | "failed")
}

/// Twilio 渠道
pub struct TwilioChannel {
    client: Client,
    channel: AlertChannel,
    credentials: TwilioCredentials,
    api_base: String,
    status_polls: u32,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl TwilioChannel {
    pub fn new(
        channel: AlertChannel,
        credentials: TwilioCredentials,
        status_polls: u32,
        poll_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self {
            client,
            channel,
            credentials,
            api_base: TWILIO_API_BASE.to_string(),
            status_polls,
            poll_interval,
            clock,
        })
    }

    /// 覆盖 API 基础 URL（代理或测试）
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.credentials.account_sid
        )
    }

    fn message_url(&self, sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages/{}.json",
            self.api_base, self.credentials.account_sid, sid
        )
    }

    fn fetch_message(&self, sid: &str) -> Result<MessageResource> {
        let message = self
            .client
            .get(self.message_url(sid))
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()?
            .error_for_status()?
            .json::<MessageResource>()?;
        Ok(message)
    }

    /// 轮询投递状态，返回最后一次看到的状态
    pub fn poll_delivery(&self, sid: &str) -> Option<String> {
        let mut last_status = None;

        for attempt in 1..=self.status_polls {
            self.clock.sleep(self.poll_interval);

            match self.fetch_message(sid) {
                Ok(message) => {
                    info!(
                        sid = %sid,
                        attempt,
                        status = ?message.status,
                        error_code = ?message.error_code,
                        error_message = ?message.error_message,
                        "Delivery status"
                    );
                    let terminal = message.status.as_deref().map_or(false, is_terminal_status);
                    last_status = message.status;
                    if terminal {
                        break;
                    }
                }
                Err(e) => {
                    warn!(sid = %sid, attempt, error = %e, "Delivery status check failed");
                    break;
                }
            }
        }

        last_status
    }
}

impl NotificationChannel for TwilioChannel {
    fn name(&self) -> &str {
        self.channel.as_str()
    }

    fn send(&self, message: &str) -> Result<SendResult> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&[
                ("Body", message),
                ("From", self.credentials.from.as_str()),
                ("To", self.credentials.to.as_str()),
            ])
            .send()
            .map_err(|e| anyhow!("Twilio request failed: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| anyhow!("Failed to read Twilio response: {}", e))?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<ApiError>(&body) {
                Ok(ApiError { code: Some(code), message }) => format!("{} (HTTP {}, code {})", message, status.as_u16(), code),
                Ok(ApiError { code: None, message }) => format!("{} (HTTP {})", message, status.as_u16()),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            warn!(channel = %self.channel, error = %reason, "Failed to send alert via Twilio");
            return Ok(SendResult::Failed(reason));
        }

        let created: MessageResource = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse Twilio response: {} - body: {}", e, body))?;

        info!(
            channel = %self.channel,
            to = %self.credentials.to,
            sid = %created.sid,
            status = ?created.status,
            "Alert sent via Twilio"
        );

        self.poll_delivery(&created.sid);

        Ok(SendResult::Sent)
    }
}
