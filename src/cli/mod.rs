//! CLI command handling

pub mod check;
pub mod test_alert;
pub mod watch;

pub use check::*;
pub use test_alert::*;
pub use watch::*;
