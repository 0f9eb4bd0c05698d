//! 具体渠道实现

pub mod twilio;

pub use twilio::TwilioChannel;
