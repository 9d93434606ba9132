use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::errors::RollcallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
    Maybe,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Unavailable => "unavailable",
            Availability::Maybe => "maybe",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Availability::Available),
            "unavailable" => Ok(Availability::Unavailable),
            "maybe" => Ok(Availability::Maybe),
            other => Err(RollcallError::Validation(format!(
                "Invalid availability: {}",
                other
            ))),
        }
    }
}

/// A member's answer for one candidate. At most one row exists per
/// (schedule, member, candidate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub member_id: Uuid,
    pub candidate_id: Uuid,
    pub availability: Availability,
    pub note: String,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponsesRequest {
    pub member_id: Uuid,
    pub responses: Vec<ResponseEntry>,
}

/// One answer in a public submission. `availability` stays a raw string so
/// that the whole batch can be rejected when one value is bad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub candidate_id: Uuid,
    pub availability: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponsesResponse {
    pub schedule_id: Uuid,
    pub member_id: Uuid,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub candidate_id: Uuid,
    pub available: usize,
    pub unavailable: usize,
    pub maybe: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseListing {
    pub schedule_id: Uuid,
    pub responses: Vec<ScheduleResponse>,
    pub tallies: Vec<CandidateTally>,
}
