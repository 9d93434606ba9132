use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One proposed date (with an optional time window) on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDate {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl CandidateDate {
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// A candidate as the admin submits it: no id, position given by list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInput {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl CandidateInput {
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Natural identity of a candidate across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateKey {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}
