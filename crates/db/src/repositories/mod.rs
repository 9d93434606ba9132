pub mod attendance;
pub mod member_group;
pub mod schedule;

pub use member_group::PgMemberGroupRepository;
