pub mod attendance;
pub mod candidate;
pub mod group;
pub mod response;
pub mod schedule;
