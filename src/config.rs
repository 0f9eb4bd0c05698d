//! 配置模块 - 从环境变量和 .env 文件加载监控配置
//!
//! env 文件查找顺序：
//! 1. `--env-file` 指定的路径
//! 2. 当前目录下的 `.env`
//! 3. `~/.config/bamboo-monitor/.env`
//!
//! env 文件中的值覆盖进程环境变量。配置在启动时加载一次，之后只读。

use crate::watcher::Thresholds;
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// 默认检查间隔（秒）- 15 分钟
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 900;

/// 默认探测超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 默认投递状态轮询次数
pub const DEFAULT_STATUS_POLLS: u32 = 6;

/// 默认投递状态轮询间隔（秒）
pub const DEFAULT_STATUS_POLL_INTERVAL_SECS: u64 = 10;

/// Bamboo REST 项目接口路径
const PROJECT_API_PATH: &str = "/rest/api/latest/project";

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// WhatsApp 地址格式: whatsapp:+<E.164>
const WHATSAPP_ADDRESS_PATTERN: &str = r"^whatsapp:\+[1-9]\d{6,14}$";

/// 探测认证方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    Bearer(String),
    Basic { user: String, pass: String },
}

impl Auth {
    pub fn mode(&self) -> &'static str {
        match self {
            Auth::None => "none",
            Auth::Bearer(_) => "bearer",
            Auth::Basic { .. } => "basic",
        }
    }
}

/// 告警渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChannel {
    WhatsApp,
    Sms,
}

impl AlertChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertChannel::WhatsApp => "whatsapp",
            AlertChannel::Sms => "sms",
        }
    }
}

impl std::fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertChannel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "whatsapp" => Ok(AlertChannel::WhatsApp),
            "sms" => Ok(AlertChannel::Sms),
            other => Err(anyhow!("unsupported ALERT_CHANNEL '{}', expected whatsapp or sms", other)),
        }
    }
}

/// 探测配置
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// 完整的探测 URL
    pub target_url: String,
    /// 请求超时
    pub timeout: Duration,
    /// 认证方式
    pub auth: Auth,
}

/// Twilio 配置（凭据缺失不是致命错误，只会跳过发送）
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// 发送后查询投递状态的次数，0 表示不查询
    pub status_polls: u32,
    /// 每次查询之间的间隔
    pub status_poll_interval: Duration,
}

/// Complete set of values needed to send through Twilio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
}

impl TwilioConfig {
    /// 四项都存在时返回凭据
    pub fn credentials(&self) -> Option<TwilioCredentials> {
        Some(TwilioCredentials {
            account_sid: self.account_sid.clone()?,
            auth_token: self.auth_token.clone()?,
            from: self.from.clone()?,
            to: self.to.clone()?,
        })
    }
}

/// 告警配置
#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub channel: AlertChannel,
    pub twilio: TwilioConfig,
}

/// 监控进程的完整配置
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Bamboo 基础 URL（已去掉末尾的 `/`）
    pub base_url: String,
    /// 项目 key
    pub project_key: String,
    pub probe: ProbeConfig,
    /// 两次检查之间的间隔
    pub check_interval: Duration,
    pub thresholds: Thresholds,
    pub alert: AlertConfig,
}

impl MonitorConfig {
    /// 加载 env 文件后从进程环境读取配置
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        load_env_file(env_file)?;
        Self::from_env()
    }

    /// 从进程环境读取配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意 key 查询函数构建配置
    ///
    /// 空字符串视为未设置。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = get("BAMBOO_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        let project_key = get("PROJECT_KEY");
        let (base_url, project_key) = match (base_url, project_key) {
            (Some(base_url), Some(project_key)) => (base_url, project_key),
            _ => bail!("Please set BAMBOO_BASE_URL and PROJECT_KEY (environment or .env)"),
        };

        let auth = if let Some(token) = get("BEARER_TOKEN") {
            Auth::Bearer(token)
        } else if let (Some(user), Some(pass)) = (get("BASIC_AUTH_USER"), get("BASIC_AUTH_PASS")) {
            Auth::Basic { user, pass }
        } else {
            Auth::None
        };

        let check_interval = parse_positive::<u64>(&get, "CHECK_INTERVAL_SECONDS", DEFAULT_CHECK_INTERVAL_SECS)?;
        let timeout = parse_positive::<u64>(&get, "TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS)?;
        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            up: parse_positive::<u32>(&get, "CONSECUTIVE_UPS_REQUIRED", defaults.up)?,
            down: parse_positive::<u32>(&get, "CONSECUTIVE_DOWNS_REQUIRED", defaults.down)?,
        };

        let channel = match get("ALERT_CHANNEL") {
            Some(raw) => raw.parse::<AlertChannel>()?,
            None => AlertChannel::WhatsApp,
        };

        let twilio = TwilioConfig {
            account_sid: get("TWILIO_ACCOUNT_SID"),
            auth_token: get("TWILIO_AUTH_TOKEN"),
            from: get("TWILIO_FROM"),
            to: get("TWILIO_TO"),
            status_polls: parse_or::<u32>(&get, "TWILIO_STATUS_POLLS", DEFAULT_STATUS_POLLS)?,
            status_poll_interval: Duration::from_secs(parse_or::<u64>(
                &get,
                "TWILIO_STATUS_POLL_INTERVAL_SECONDS",
                DEFAULT_STATUS_POLL_INTERVAL_SECS,
            )?),
        };
        validate_addresses(channel, &twilio)?;

        let target_url = build_target_url(&base_url, &project_key);

        Ok(Self {
            base_url,
            project_key,
            probe: ProbeConfig {
                target_url,
                timeout: Duration::from_secs(timeout),
                auth,
            },
            check_interval: Duration::from_secs(check_interval),
            thresholds,
            alert: AlertConfig { channel, twilio },
        })
    }

    pub fn target_url(&self) -> &str {
        &self.probe.target_url
    }
}

/// 拼接 Bamboo 项目接口 URL
pub fn build_target_url(base_url: &str, project_key: &str) -> String {
    format!(
        "{}{}/{}?expand=plans&max-result=500",
        base_url.trim_end_matches('/'),
        PROJECT_API_PATH,
        project_key
    )
}

/// 加载 env 文件，值覆盖已有环境变量
///
/// 显式指定的文件必须存在；默认位置不存在时静默跳过。返回实际加载的路径。
pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        dotenvy::from_path_override(path)
            .with_context(|| format!("Failed to load env file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded env file");
        return Ok(Some(path.to_path_buf()));
    }

    for path in default_env_files() {
        if path.is_file() {
            dotenvy::from_path_override(&path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
            debug!(path = %path.display(), "Loaded env file");
            return Ok(Some(path));
        }
    }

    Ok(None)
}

fn default_env_files() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(".env")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/bamboo-monitor/.env"));
    }
    paths
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid {} '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_positive<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let value = parse_or(get, key, default)?;
    if value == T::default() {
        bail!("{} must be greater than zero", key);
    }
    Ok(value)
}

fn validate_addresses(channel: AlertChannel, twilio: &TwilioConfig) -> Result<()> {
    match channel {
        AlertChannel::WhatsApp => {
            let pattern = Regex::new(WHATSAPP_ADDRESS_PATTERN)?;
            let valid = |addr: &Option<String>| addr.as_deref().map_or(false, |a| pattern.is_match(a));
            if !(valid(&twilio.from) && valid(&twilio.to)) {
                bail!("For WhatsApp, TWILIO_FROM and TWILIO_TO must look like 'whatsapp:+<country code><number>'");
            }
        }
        AlertChannel::Sms => {
            let prefixed = |addr: &Option<String>| addr.as_deref().map_or(false, |a| a.starts_with(WHATSAPP_PREFIX));
            if prefixed(&twilio.from) || prefixed(&twilio.to) {
                bail!("For SMS, TWILIO_FROM and TWILIO_TO must not carry the 'whatsapp:' prefix");
            }
        }
    }
    Ok(())
}
