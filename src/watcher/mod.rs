//! Availability watching - debounce state machine and the polling loop

mod debounce;
mod monitor;

pub use debounce::{MonitorState, Observation, Status, Thresholds, TransitionEvent};
pub use monitor::Monitor;
