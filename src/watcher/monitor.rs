//! 监控循环 - 探测、防抖、通知、休眠
//!
//! 单线程顺序执行，除进程终止外没有停止条件。

use super::debounce::{MonitorState, Observation, Thresholds, TransitionEvent};
use crate::clock::Clock;
use crate::notification::{render, Notifier};
use crate::probe::Prober;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 可用性监控器
pub struct Monitor {
    prober: Box<dyn Prober>,
    notifier: Box<dyn Notifier>,
    clock: Arc<dyn Clock>,
    state: MonitorState,
    interval: Duration,
    target_url: String,
}

impl Monitor {
    pub fn new(
        prober: Box<dyn Prober>,
        notifier: Box<dyn Notifier>,
        clock: Arc<dyn Clock>,
        thresholds: Thresholds,
        interval: Duration,
        target_url: impl Into<String>,
    ) -> Self {
        Self {
            prober,
            notifier,
            clock,
            state: MonitorState::new(thresholds),
            interval,
            target_url: target_url.into(),
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// 执行一轮检查（不休眠），返回本轮发出的通知事件
    pub fn run_cycle(&mut self) -> Option<TransitionEvent> {
        let is_up = self.prober.probe();
        let observation = self.state.step(is_up);
        self.log_observation(&observation);

        let event = observation.event()?;
        let message = render(event, &self.target_url, &self.clock.now());
        info!(event = ?event, "{}", message);
        self.notifier.send(&message);
        Some(event)
    }

    /// 执行固定轮数，轮与轮之间休眠
    pub fn run_cycles(&mut self, cycles: usize) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        for cycle in 0..cycles {
            if let Some(event) = self.run_cycle() {
                events.push(event);
            }
            if cycle + 1 < cycles {
                self.clock.sleep(self.interval);
            }
        }
        events
    }

    /// 无限循环，直到进程被终止
    pub fn run(&mut self) -> ! {
        info!(
            url = %self.target_url,
            interval_secs = self.interval.as_secs(),
            up_threshold = self.state.thresholds().up,
            down_threshold = self.state.thresholds().down,
            "Monitoring Bamboo endpoint"
        );

        loop {
            self.run_cycle();
            self.clock.sleep(self.interval);
        }
    }

    fn log_observation(&self, observation: &Observation) {
        match observation {
            Observation::Confirming { is_up: true, count, threshold } => {
                info!("Looks UP ({}/{})… confirming…", count, threshold);
            }
            Observation::Confirming { is_up: false, count, threshold } => {
                info!("Looks DOWN ({}/{})… confirming…", count, threshold);
            }
            Observation::StillUp => info!("Still UP (stable)."),
            Observation::StillDown => {
                info!("Still DOWN… next check in {}s", self.interval.as_secs());
            }
            Observation::Transition(TransitionEvent::Down) => info!("Transitioned to DOWN."),
            Observation::Transition(TransitionEvent::Up) => debug!("Transitioned to UP."),
        }
    }
}
