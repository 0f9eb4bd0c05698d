//! Watch 命令 - 启动监控循环

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::notification::NotificationDispatcher;
use crate::probe::HttpProber;
use crate::watcher::Monitor;
use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tracing::info;

/// Watch 命令参数
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// 只记录告警，不实际发送
    #[arg(long)]
    pub dry_run: bool,

    /// 执行指定轮数后退出（默认无限循环）
    #[arg(long)]
    pub cycles: Option<usize>,
}

/// 根据配置组装监控器
pub fn build_monitor(config: &MonitorConfig, clock: Arc<dyn Clock>, dry_run: bool) -> Result<Monitor> {
    let prober = HttpProber::new(config.probe.clone())?;
    let dispatcher = NotificationDispatcher::from_config(&config.alert, clock.clone())?.with_dry_run(dry_run);

    Ok(Monitor::new(
        Box::new(prober),
        Box::new(dispatcher),
        clock,
        config.thresholds,
        config.check_interval,
        config.target_url(),
    ))
}

/// 处理 watch 命令
pub fn handle_watch(config: &MonitorConfig, args: WatchArgs) -> Result<()> {
    info!(
        url = %config.target_url(),
        interval_secs = config.check_interval.as_secs(),
        interval_min = %format!("{:.1}", config.check_interval.as_secs_f64() / 60.0),
        auth = config.probe.auth.mode(),
        channel = %config.alert.channel,
        "Starting Bamboo monitor"
    );

    let mut monitor = build_monitor(config, Arc::new(SystemClock), args.dry_run)?;

    match args.cycles {
        Some(cycles) => {
            let events = monitor.run_cycles(cycles);
            info!(cycles, events = events.len(), status = %monitor.state().status(), "Finished");
            Ok(())
        }
        None => monitor.run(),
    }
}
