//! Use cases over the repository contracts. Each service takes its
//! collaborators at construction and owns the transaction scope of the
//! operations it exposes.

pub mod conversion;
pub mod response;
pub mod schedule;


use uuid::Uuid;

use crate::errors::{RollcallError, RollcallResult};
use crate::models::schedule::Schedule;
use crate::repositories::ScheduleRepository;
use crate::token;

/// Loads a schedule for an admin caller. Deleted schedules only come back
/// when `include_deleted` is set.
pub(crate) async fn load_schedule(
    repo: &mut dyn ScheduleRepository,
    tenant_id: Uuid,
    schedule_id: Uuid,
    include_deleted: bool,
) -> RollcallResult<Schedule> {
    repo.find_schedule(tenant_id, schedule_id)
        .await?
        .filter(|s| include_deleted || !s.is_deleted())
        .ok_or_else(|| RollcallError::NotFound(format!("Schedule with ID {} not found", schedule_id)))
}

/// Resolves a public token. Every failure looks the same to the caller.
pub(crate) async fn resolve_public_schedule(
    repo: &mut dyn ScheduleRepository,
    public_token: &str,
) -> RollcallResult<Schedule> {
    if !token::is_well_formed(public_token) {
        return Err(public_not_found());
    }
    repo.find_schedule_by_token(public_token)
        .await?
        .filter(|s| !s.is_deleted())
        .ok_or_else(public_not_found)
}

fn public_not_found() -> RollcallError {
    RollcallError::NotFound("schedule not found".to_string())
}

pub(crate) fn require_title(title: &str) -> RollcallResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RollcallError::Validation("Title must not be empty".to_string()));
    }
    Ok(title.to_string())
}
