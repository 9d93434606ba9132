pub mod attendance;
pub mod public;
pub mod schedule;
