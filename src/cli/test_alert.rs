//! Test-alert 命令 - 通过已配置的渠道发送一条测试消息

use crate::clock::{format_timestamp, Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::notification::{NotificationDispatcher, SendResult};
use anyhow::{bail, Result};
use clap::Args;
use std::sync::Arc;

/// Test-alert 命令参数
#[derive(Args, Debug)]
pub struct TestAlertArgs {
    /// 自定义消息内容
    #[arg(long, short)]
    pub message: Option<String>,

    /// 只打印不发送
    #[arg(long)]
    pub dry_run: bool,
}

/// 处理 test-alert 命令
pub fn handle_test_alert(config: &MonitorConfig, args: TestAlertArgs) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dispatcher = NotificationDispatcher::from_config(&config.alert, clock.clone())?.with_dry_run(args.dry_run);

    if dispatcher.channel_count() == 0 {
        bail!("Missing Twilio variables (TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_FROM, TWILIO_TO); cannot send test alert");
    }

    let message = args.message.unwrap_or_else(|| {
        format!(
            "🔔 Bamboo monitor test alert\nURL: {}\nTime: {}",
            config.target_url(),
            format_timestamp(&clock.now())
        )
    });

    let mut failed = false;
    for (channel, result) in dispatcher.send_all(&message) {
        match result {
            SendResult::Sent => println!("{}: sent", channel),
            SendResult::Skipped(reason) => println!("{}: skipped ({})", channel, reason),
            SendResult::Failed(reason) => {
                failed = true;
                println!("{}: failed ({})", channel, reason);
            }
        }
    }

    if failed {
        bail!("Test alert was not delivered");
    }
    Ok(())
}
