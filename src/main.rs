//! Bamboo Monitor CLI
//!
//! 定期探测 Bamboo 服务器，可用性变化时通过 WhatsApp / SMS 通知

use anyhow::Result;
use bamboo_monitor::cli::{
    handle_check, handle_test_alert, handle_watch, CheckArgs, TestAlertArgs, WatchArgs,
};
use bamboo_monitor::config::MonitorConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "bam")]
#[command(about = "Bamboo Monitor - 监控 Bamboo 可用性并发送告警")]
#[command(version)]
struct Cli {
    /// env 文件路径（默认 ./.env 或 ~/.config/bamboo-monitor/.env）
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 持续监控并在状态变化时告警
    Watch(WatchArgs),
    /// 执行一次探测（可用时退出码 0，否则 1）
    Check(CheckArgs),
    /// 发送一条测试告警
    TestAlert(TestAlertArgs),
}

fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug bam watch
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bamboo_monitor=info,bam=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    let config = MonitorConfig::load(cli.env_file.as_deref())?;

    match cli.command {
        Commands::Watch(args) => handle_watch(&config, args)?,
        Commands::Check(args) => {
            if !handle_check(&config, args)? {
                std::process::exit(1);
            }
        }
        Commands::TestAlert(args) => handle_test_alert(&config, args)?,
    }

    Ok(())
}
