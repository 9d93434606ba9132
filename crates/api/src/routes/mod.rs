pub mod attendance;
pub mod health;
pub mod public;
pub mod schedule;
