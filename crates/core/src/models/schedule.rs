use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::errors::{RollcallError, RollcallResult};
use crate::models::candidate::{CandidateDate, CandidateInput};

/// Lifecycle of a coordination schedule.
///
/// `Open` → `Closed` → `Decided` is the normal progression, `Decided` is
/// also reachable straight from `Open`. `Deleted` is terminal and reachable
/// from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Open,
    Closed,
    Decided,
    Deleted,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Open => "open",
            ScheduleStatus::Closed => "closed",
            ScheduleStatus::Decided => "decided",
            ScheduleStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ScheduleStatus::Open),
            "closed" => Ok(ScheduleStatus::Closed),
            "decided" => Ok(ScheduleStatus::Decided),
            "deleted" => Ok(ScheduleStatus::Deleted),
            other => Err(RollcallError::Validation(format!(
                "Unknown schedule status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub event_id: Option<Uuid>,
    pub public_token: String,
    pub status: ScheduleStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub decided_candidate_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Moves an open schedule to `Closed`.
    pub fn close(&mut self, now: DateTime<Utc>) -> RollcallResult<()> {
        match self.status {
            ScheduleStatus::Open => {
                self.status = ScheduleStatus::Closed;
                self.updated_at = now;
                Ok(())
            }
            ScheduleStatus::Closed => Err(RollcallError::Conflict(
                "Schedule is already closed".to_string(),
            )),
            ScheduleStatus::Decided => Err(RollcallError::Conflict(
                "Schedule has already been decided".to_string(),
            )),
            ScheduleStatus::Deleted => {
                Err(RollcallError::Conflict("Schedule is deleted".to_string()))
            }
        }
    }

    /// Records `candidate_id` as the chosen date.
    ///
    /// Allowed from `Open` and `Closed`. A schedule that is already decided
    /// keeps its decision.
    pub fn decide(
        &mut self,
        candidate_id: Uuid,
        candidates: &[CandidateDate],
        now: DateTime<Utc>,
    ) -> RollcallResult<()> {
        match self.status {
            ScheduleStatus::Open | ScheduleStatus::Closed => {}
            ScheduleStatus::Decided => {
                return Err(RollcallError::Conflict(
                    "Schedule has already been decided".to_string(),
                ));
            }
            ScheduleStatus::Deleted => {
                return Err(RollcallError::Conflict("Schedule is deleted".to_string()));
            }
        }

        if !candidates.iter().any(|c| c.id == candidate_id) {
            return Err(RollcallError::NotFound(format!(
                "Candidate {} not found on schedule {}",
                candidate_id, self.id
            )));
        }

        self.status = ScheduleStatus::Decided;
        self.decided_candidate_id = Some(candidate_id);
        self.updated_at = now;
        Ok(())
    }

    /// Soft-deletes the schedule.
    pub fn delete(&mut self, now: DateTime<Utc>) -> RollcallResult<()> {
        if self.status == ScheduleStatus::Deleted {
            return Err(RollcallError::Conflict(
                "Schedule is already deleted".to_string(),
            ));
        }
        self.status = ScheduleStatus::Deleted;
        self.updated_at = now;
        Ok(())
    }

    /// Whether member responses are accepted at `now`. The deadline itself
    /// is still inside the window.
    pub fn can_respond(&self, now: DateTime<Utc>) -> bool {
        self.status == ScheduleStatus::Open && self.deadline.is_none_or(|deadline| now <= deadline)
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ScheduleStatus::Deleted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_id: Option<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub candidates: Vec<CandidateInput>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
}

/// Full desired state of a schedule. Candidates are matched to the stored
/// ones by date and time window, never by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_id: Option<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub candidates: Vec<CandidateInput>,
    /// Replaces the schedule's group assignments when present
    pub group_ids: Option<Vec<Uuid>>,
    /// Allows removing candidates that already have responses
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideScheduleRequest {
    pub candidate_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDetail {
    pub schedule: Schedule,
    pub candidates: Vec<CandidateDate>,
    pub group_ids: Vec<Uuid>,
}

/// What an unauthenticated holder of the public token gets to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicScheduleView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ScheduleStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub decided_candidate_id: Option<Uuid>,
    pub accepting_responses: bool,
    pub candidates: Vec<CandidateDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn schedule(status: ScheduleStatus, deadline: Option<DateTime<Utc>>) -> Schedule {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        Schedule {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            title: "Summer match".to_string(),
            description: String::new(),
            event_id: None,
            public_token: "a".repeat(32),
            status,
            deadline,
            decided_candidate_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn candidate(schedule_id: Uuid) -> CandidateDate {
        CandidateDate {
            id: Uuid::new_v4(),
            schedule_id,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            start_time: None,
            end_time: None,
            display_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn close_only_from_open() {
        let now = Utc::now();
        let mut s = schedule(ScheduleStatus::Open, None);
        s.close(now).unwrap();
        assert_eq!(s.status, ScheduleStatus::Closed);
        assert_eq!(s.updated_at, now);

        assert!(matches!(s.close(now), Err(RollcallError::Conflict(_))));

        let mut deleted = schedule(ScheduleStatus::Deleted, None);
        assert!(matches!(deleted.close(now), Err(RollcallError::Conflict(_))));
    }

    #[test]
    fn decide_from_open_and_closed() {
        for status in [ScheduleStatus::Open, ScheduleStatus::Closed] {
            let mut s = schedule(status, None);
            let c = candidate(s.id);
            s.decide(c.id, std::slice::from_ref(&c), Utc::now()).unwrap();
            assert_eq!(s.status, ScheduleStatus::Decided);
            assert_eq!(s.decided_candidate_id, Some(c.id));
        }
    }

    #[test]
    fn decide_rejects_unknown_candidate() {
        let mut s = schedule(ScheduleStatus::Open, None);
        let c = candidate(s.id);
        let err = s.decide(Uuid::new_v4(), &[c], Utc::now()).unwrap_err();
        assert!(matches!(err, RollcallError::NotFound(_)));
        assert_eq!(s.status, ScheduleStatus::Open);
        assert_eq!(s.decided_candidate_id, None);
    }

    #[test]
    fn decide_twice_is_rejected() {
        let mut s = schedule(ScheduleStatus::Open, None);
        let first = candidate(s.id);
        let second = candidate(s.id);
        let all = vec![first.clone(), second.clone()];
        s.decide(first.id, &all, Utc::now()).unwrap();

        let err = s.decide(second.id, &all, Utc::now()).unwrap_err();
        assert!(matches!(err, RollcallError::Conflict(_)));
        assert_eq!(s.decided_candidate_id, Some(first.id));
    }

    #[test]
    fn delete_is_terminal() {
        let mut s = schedule(ScheduleStatus::Decided, None);
        s.delete(Utc::now()).unwrap();
        assert!(s.is_deleted());
        assert!(matches!(s.delete(Utc::now()), Err(RollcallError::Conflict(_))));
        let c = candidate(s.id);
        assert!(s.decide(c.id, &[c], Utc::now()).is_err());
    }

    #[test]
    fn can_respond_honours_status_and_deadline() {
        let deadline = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap();
        let open = schedule(ScheduleStatus::Open, Some(deadline));

        assert!(open.can_respond(deadline - Duration::days(1)));
        assert!(open.can_respond(deadline));
        assert!(!open.can_respond(deadline + Duration::seconds(1)));

        let no_deadline = schedule(ScheduleStatus::Open, None);
        assert!(no_deadline.can_respond(deadline + Duration::days(365)));

        for status in [
            ScheduleStatus::Closed,
            ScheduleStatus::Decided,
            ScheduleStatus::Deleted,
        ] {
            assert!(!schedule(status, None).can_respond(deadline));
        }
    }

    #[test]
    fn status_parses_its_own_output() {
        for status in [
            ScheduleStatus::Open,
            ScheduleStatus::Closed,
            ScheduleStatus::Decided,
            ScheduleStatus::Deleted,
        ] {
            assert_eq!(status.as_str().parse::<ScheduleStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ScheduleStatus>().is_err());
    }
}
