use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::errors::RollcallError;
use crate::models::response::Availability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Open,
    Closed,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Open => "open",
            CollectionStatus::Closed => "closed",
        }
    }
}

impl FromStr for CollectionStatus {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(CollectionStatus::Open),
            "closed" => Ok(CollectionStatus::Closed),
            other => Err(RollcallError::Validation(format!(
                "Unknown collection status: {}",
                other
            ))),
        }
    }
}

/// What an attendance collection is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Event,
    Standalone,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Event => "event",
            TargetType::Standalone => "standalone",
        }
    }
}

impl FromStr for TargetType {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(TargetType::Event),
            "standalone" => Ok(TargetType::Standalone),
            other => Err(RollcallError::Validation(format!(
                "Unknown target type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Attending,
    Absent,
    Undecided,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Attending => "attending",
            ResponseType::Absent => "absent",
            ResponseType::Undecided => "undecided",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attending" => Ok(ResponseType::Attending),
            "absent" => Ok(ResponseType::Absent),
            "undecided" => Ok(ResponseType::Undecided),
            other => Err(RollcallError::Validation(format!(
                "Invalid response type: {}",
                other
            ))),
        }
    }
}

/// Availability carried into attendance. A member with no answer is undecided.
impl From<Option<Availability>> for ResponseType {
    fn from(availability: Option<Availability>) -> Self {
        match availability {
            Some(Availability::Available) => ResponseType::Attending,
            Some(Availability::Unavailable) => ResponseType::Absent,
            Some(Availability::Maybe) | None => ResponseType::Undecided,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceCollection {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub target_type: TargetType,
    pub target_id: Option<Uuid>,
    pub public_token: String,
    pub deadline: Option<DateTime<Utc>>,
    pub status: CollectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDate {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub member_id: Uuid,
    pub target_date_id: Uuid,
    pub response: ResponseType,
    pub note: String,
    pub available_from: Option<NaiveTime>,
    pub available_to: Option<NaiveTime>,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertToAttendanceRequest {
    pub candidate_ids: Vec<Uuid>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertToAttendanceResponse {
    pub collection_id: Uuid,
    pub public_token: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDetail {
    pub collection: AttendanceCollection,
    pub target_dates: Vec<TargetDate>,
    pub group_ids: Vec<Uuid>,
    pub responses: Vec<AttendanceResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(Availability::Available), ResponseType::Attending)]
    #[case(Some(Availability::Unavailable), ResponseType::Absent)]
    #[case(Some(Availability::Maybe), ResponseType::Undecided)]
    #[case(None, ResponseType::Undecided)]
    fn availability_maps_to_one_response_type(
        #[case] availability: Option<Availability>,
        #[case] expected: ResponseType,
    ) {
        assert_eq!(ResponseType::from(availability), expected);
    }
}
