//! 可用性防抖状态机 - 将单次探测结果转换为稳定的 UP/DOWN 信号
//!
//! 每个方向独立计数：连续成功达到 `up` 阈值才确认 UP，连续失败达到
//! `down` 阈值才确认 DOWN。每个 UP 周期最多通知一次，每个 DOWN 周期最多通知一次。

use serde::{Deserialize, Serialize};

/// 已确认的可用性状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Unknown,
    Up,
    Down,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::Up => "UP",
            Status::Down => "DOWN",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 需要通知的状态转换
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionEvent {
    Up,
    Down,
}

/// 确认阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// 确认 UP 需要的连续成功次数
    pub up: u32,
    /// 确认 DOWN 需要的连续失败次数
    pub down: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { up: 2, down: 1 }
    }
}

/// One cycle's outcome, richer than the event alone so the loop can log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Counter below its threshold
    Confirming { is_up: bool, count: u32, threshold: u32 },
    /// Confirmed transition that must be notified
    Transition(TransitionEvent),
    /// Already UP, nothing to send
    StillUp,
    /// Already DOWN and notified for this episode
    StillDown,
}

impl Observation {
    pub fn event(&self) -> Option<TransitionEvent> {
        match self {
            Observation::Transition(event) => Some(*event),
            _ => None,
        }
    }
}

/// 监控状态，只由 [`MonitorState::step`] 修改
#[derive(Debug, Clone)]
pub struct MonitorState {
    status: Status,
    consecutive_up_count: u32,
    consecutive_down_count: u32,
    down_notified: bool,
    thresholds: Thresholds,
}

impl MonitorState {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            status: Status::Unknown,
            consecutive_up_count: 0,
            consecutive_down_count: 0,
            down_notified: false,
            thresholds,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn consecutive_up_count(&self) -> u32 {
        self.consecutive_up_count
    }

    pub fn consecutive_down_count(&self) -> u32 {
        self.consecutive_down_count
    }

    pub fn down_notified(&self) -> bool {
        self.down_notified
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// 输入一次探测结果，返回需要发送的通知（如有）
    pub fn observe(&mut self, is_up: bool) -> Option<TransitionEvent> {
        self.step(is_up).event()
    }

    /// 输入一次探测结果，返回本轮的完整结果
    pub fn step(&mut self, is_up: bool) -> Observation {
        if is_up {
            self.consecutive_up_count = self.consecutive_up_count.saturating_add(1);
            self.consecutive_down_count = 0;

            if self.consecutive_up_count < self.thresholds.up {
                return Observation::Confirming {
                    is_up,
                    count: self.consecutive_up_count,
                    threshold: self.thresholds.up,
                };
            }

            if self.status == Status::Up {
                return Observation::StillUp;
            }

            self.status = Status::Up;
            self.down_notified = false;
            self.consecutive_up_count = 0;
            Observation::Transition(TransitionEvent::Up)
        } else {
            self.consecutive_up_count = 0;
            self.consecutive_down_count = self.consecutive_down_count.saturating_add(1);

            if self.consecutive_down_count < self.thresholds.down {
                return Observation::Confirming {
                    is_up,
                    count: self.consecutive_down_count,
                    threshold: self.thresholds.down,
                };
            }

            // 状态转换和通知分开判断：DOWN 周期内只通知一次
            if self.status != Status::Down {
                self.status = Status::Down;
            }

            if self.down_notified {
                return Observation::StillDown;
            }

            self.down_notified = true;
            Observation::Transition(TransitionEvent::Down)
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(thresholds: Thresholds, inputs: &[bool]) -> Vec<(usize, TransitionEvent)> {
        let mut state = MonitorState::new(thresholds);
        inputs
            .iter()
            .enumerate()
            .filter_map(|(i, &is_up)| state.observe(is_up).map(|e| (i + 1, e)))
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let state = MonitorState::default();
        assert_eq!(state.status(), Status::Unknown);
        assert_eq!(state.consecutive_up_count(), 0);
        assert_eq!(state.consecutive_down_count(), 0);
        assert!(!state.down_notified());
        assert_eq!(state.thresholds(), Thresholds { up: 2, down: 1 });
    }

    #[test]
    fn test_scenario_down_then_recover() {
        let events = run(Thresholds { up: 2, down: 1 }, &[false, false, true, true, true]);
        assert_eq!(events, vec![(1, TransitionEvent::Down), (4, TransitionEvent::Up)]);
    }

    #[test]
    fn test_scenario_up_blip_up() {
        let events = run(Thresholds { up: 2, down: 1 }, &[true, true, true, false, true, true]);
        assert_eq!(
            events,
            vec![
                (2, TransitionEvent::Up),
                (4, TransitionEvent::Down),
                (6, TransitionEvent::Up),
            ]
        );
    }

    #[test]
    fn test_scenario_single_success_resets_down_counter() {
        let mut state = MonitorState::new(Thresholds { up: 3, down: 2 });

        assert_eq!(
            state.step(false),
            Observation::Confirming { is_up: false, count: 1, threshold: 2 }
        );
        assert_eq!(
            state.step(true),
            Observation::Confirming { is_up: true, count: 1, threshold: 3 }
        );
        assert_eq!(state.consecutive_down_count(), 0);
        assert_eq!(
            state.step(false),
            Observation::Confirming { is_up: false, count: 1, threshold: 2 }
        );
        assert_eq!(state.step(false), Observation::Transition(TransitionEvent::Down));
        assert_eq!(state.status(), Status::Down);
    }

    #[test]
    fn test_up_counter_reset_after_transition() {
        let mut state = MonitorState::new(Thresholds { up: 2, down: 1 });
        state.observe(true);
        assert_eq!(state.observe(true), Some(TransitionEvent::Up));
        assert_eq!(state.consecutive_up_count(), 0);
        assert_eq!(state.consecutive_down_count(), 0);

        // 计数器已清零，下一次成功重新计数，但不会再次通知
        assert_eq!(
            state.step(true),
            Observation::Confirming { is_up: true, count: 1, threshold: 2 }
        );
        assert_eq!(state.step(true), Observation::StillUp);
        assert_eq!(state.step(true), Observation::StillUp);
    }

    #[test]
    fn test_stable_up_never_renotifies() {
        let events = run(Thresholds::default(), &[true; 50]);
        assert_eq!(events, vec![(2, TransitionEvent::Up)]);
    }

    #[test]
    fn test_down_notified_once_per_episode() {
        let mut state = MonitorState::new(Thresholds { up: 2, down: 1 });
        assert_eq!(state.observe(false), Some(TransitionEvent::Down));
        assert!(state.down_notified());

        // 单次成功未达到 UP 阈值，不重置 down_notified
        assert_eq!(state.observe(true), None);
        assert_eq!(state.status(), Status::Down);
        assert!(state.down_notified());

        assert_eq!(state.step(false), Observation::StillDown);
        assert_eq!(state.step(false), Observation::StillDown);
    }

    #[test]
    fn test_confirmed_up_rearms_down_notification() {
        let mut state = MonitorState::new(Thresholds { up: 1, down: 1 });
        assert_eq!(state.observe(false), Some(TransitionEvent::Down));
        assert_eq!(state.observe(true), Some(TransitionEvent::Up));
        assert!(!state.down_notified());
        assert_eq!(state.observe(false), Some(TransitionEvent::Down));
    }

    #[test]
    fn test_threshold_one_boundaries() {
        let mut state = MonitorState::new(Thresholds { up: 1, down: 1 });
        assert_eq!(state.observe(true), Some(TransitionEvent::Up));
        assert_eq!(state.observe(false), Some(TransitionEvent::Down));
        assert_eq!(state.observe(true), Some(TransitionEvent::Up));
    }

    #[test]
    fn test_status_changes_exactly_at_threshold() {
        let mut state = MonitorState::new(Thresholds { up: 4, down: 3 });
        for _ in 0..3 {
            state.observe(true);
            assert_eq!(state.status(), Status::Unknown);
        }
        state.observe(true);
        assert_eq!(state.status(), Status::Up);

        for _ in 0..2 {
            state.observe(false);
            assert_eq!(state.status(), Status::Up);
        }
        state.observe(false);
        assert_eq!(state.status(), Status::Down);
    }

    #[test]
    fn test_invariants_hold_over_pseudo_random_sequence() {
        let mut state = MonitorState::new(Thresholds { up: 3, down: 2 });
        // 简单 LCG，保证序列可复现
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..2000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let is_up = (seed >> 16) % 3 != 0;
            let before = state.status();
            let event = state.observe(is_up);

            assert!(state.consecutive_up_count() == 0 || state.consecutive_down_count() == 0);
            if state.status() != Status::Down {
                assert!(!state.down_notified());
            }
            match event {
                Some(TransitionEvent::Up) => assert_ne!(before, Status::Up),
                Some(TransitionEvent::Down) => assert_eq!(state.status(), Status::Down),
                None => {}
            }
        }
    }
}
