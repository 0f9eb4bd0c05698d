//! 可达性探测 - 对 Bamboo REST 接口发起一次 GET 请求
//!
//! 2xx/3xx 视为可用；超时、连接失败、DNS 错误以及其他状态码都视为不可用。
//! 探测失败不会向调用方返回错误。

use crate::config::{Auth, ProbeConfig};
use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use tracing::debug;

/// 探测请求的 User-Agent
pub const USER_AGENT: &str = "bamboo-updown-monitor/1.0";

/// 最多跟随的重定向次数
const MAX_REDIRECTS: usize = 10;

/// 单次可达性检查
pub trait Prober {
    /// 目标可用时返回 true
    fn probe(&self) -> bool;
}

/// 状态码是否在 200..=399 范围内
pub fn is_reachable_status(code: u16) -> bool {
    (200..400).contains(&code)
}

/// 基于 reqwest 阻塞客户端的 HTTP 探测器
pub struct HttpProber {
    client: Client,
    config: ProbeConfig,
}

impl HttpProber {
    /// 创建探测器（只在 HTTP 客户端无法构建时失败）
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    pub fn target_url(&self) -> &str {
        &self.config.target_url
    }

    /// 执行请求并返回最终状态码
    fn fetch_status(&self) -> reqwest::Result<u16> {
        let request = self.client.get(&self.config.target_url);
        let request = match &self.config.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Basic { user, pass } => request.basic_auth(user, Some(pass)),
        };

        let response = request.send()?;
        Ok(response.status().as_u16())
    }
}

impl Prober for HttpProber {
    fn probe(&self) -> bool {
        match self.fetch_status() {
            Ok(code) => {
                let up = is_reachable_status(code);
                debug!(url = %self.config.target_url, status = code, up, "Probe completed");
                up
            }
            Err(e) => {
                debug!(
                    url = %self.config.target_url,
                    error = %e,
                    timeout = e.is_timeout(),
                    "Probe request failed"
                );
                false
            }
        }
    }
}
