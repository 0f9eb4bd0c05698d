//! Check 命令 - 执行一次探测并输出结果

use crate::config::MonitorConfig;
use crate::probe::{HttpProber, Prober};
use anyhow::Result;
use chrono::Local;
use clap::Args;
use serde::Serialize;

/// Check 命令参数
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// Check 命令输出
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub url: String,
    pub up: bool,
    pub checked_at: String,
}

/// 处理 check 命令，返回目标是否可用
pub fn handle_check(config: &MonitorConfig, args: CheckArgs) -> Result<bool> {
    let prober = HttpProber::new(config.probe.clone())?;
    let up = prober.probe();

    let output = CheckOutput {
        url: config.target_url().to_string(),
        up,
        checked_at: Local::now().to_rfc3339(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}: {}", output.url, if up { "UP" } else { "DOWN" });
    }

    Ok(up)
}
