use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rollcall_core::{
    errors::RollcallError,
    models::{
        attendance::{AttendanceCollection, AttendanceResponse, TargetDate},
        candidate::CandidateDate,
        group::{CollectionGroupAssignment, ScheduleGroupAssignment},
        response::ScheduleResponse,
        schedule::Schedule,
    },
};
use eyre::eyre;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Parses a string-typed enum column. A value the domain does not know is a
/// storage fault, not bad input.
fn parse_column<T>(column: &str, value: &str) -> Result<T, RollcallError>
where
    T: FromStr<Err = RollcallError>,
{
    value
        .parse()
        .map_err(|e| RollcallError::Database(eyre!("Corrupt {} column {:?}: {}", column, value, e)))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSchedule {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub event_id: Option<Uuid>,
    pub public_token: String,
    pub status: String,
    pub deadline: Option<DateTime<Utc>>,
    pub decided_candidate_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbSchedule> for Schedule {
    type Error = RollcallError;

    fn try_from(row: DbSchedule) -> Result<Self, Self::Error> {
        Ok(Schedule {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            description: row.description,
            event_id: row.event_id,
            public_token: row.public_token,
            status: parse_column("schedules.status", &row.status)?,
            deadline: row.deadline,
            decided_candidate_id: row.decided_candidate_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCandidateDate {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<DbCandidateDate> for CandidateDate {
    fn from(row: DbCandidateDate) -> Self {
        CandidateDate {
            id: row.id,
            schedule_id: row.schedule_id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            display_order: row.display_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleGroupAssignment {
    pub schedule_id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<DbScheduleGroupAssignment> for ScheduleGroupAssignment {
    fn from(row: DbScheduleGroupAssignment) -> Self {
        ScheduleGroupAssignment {
            schedule_id: row.schedule_id,
            group_id: row.group_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleResponse {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub member_id: Uuid,
    pub candidate_id: Uuid,
    pub availability: String,
    pub note: String,
    pub responded_at: DateTime<Utc>,
}

impl TryFrom<DbScheduleResponse> for ScheduleResponse {
    type Error = RollcallError;

    fn try_from(row: DbScheduleResponse) -> Result<Self, Self::Error> {
        Ok(ScheduleResponse {
            id: row.id,
            schedule_id: row.schedule_id,
            member_id: row.member_id,
            candidate_id: row.candidate_id,
            availability: parse_column("schedule_responses.availability", &row.availability)?,
            note: row.note,
            responded_at: row.responded_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAttendanceCollection {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub public_token: String,
    pub deadline: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAttendanceCollection> for AttendanceCollection {
    type Error = RollcallError;

    fn try_from(row: DbAttendanceCollection) -> Result<Self, Self::Error> {
        Ok(AttendanceCollection {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            description: row.description,
            target_type: parse_column("attendance_collections.target_type", &row.target_type)?,
            target_id: row.target_id,
            public_token: row.public_token,
            deadline: row.deadline,
            status: parse_column("attendance_collections.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTargetDate {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<DbTargetDate> for TargetDate {
    fn from(row: DbTargetDate) -> Self {
        TargetDate {
            id: row.id,
            collection_id: row.collection_id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            display_order: row.display_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCollectionGroupAssignment {
    pub collection_id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<DbCollectionGroupAssignment> for CollectionGroupAssignment {
    fn from(row: DbCollectionGroupAssignment) -> Self {
        CollectionGroupAssignment {
            collection_id: row.collection_id,
            group_id: row.group_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAttendanceResponse {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub member_id: Uuid,
    pub target_date_id: Uuid,
    pub response: String,
    pub note: String,
    pub available_from: Option<NaiveTime>,
    pub available_to: Option<NaiveTime>,
    pub responded_at: DateTime<Utc>,
}

impl TryFrom<DbAttendanceResponse> for AttendanceResponse {
    type Error = RollcallError;

    fn try_from(row: DbAttendanceResponse) -> Result<Self, Self::Error> {
        Ok(AttendanceResponse {
            id: row.id,
            collection_id: row.collection_id,
            member_id: row.member_id,
            target_date_id: row.target_date_id,
            response: parse_column("attendance_responses.response", &row.response)?,
            note: row.note,
            available_from: row.available_from,
            available_to: row.available_to,
            responded_at: row.responded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rollcall_core::models::{
        attendance::{CollectionStatus, ResponseType, TargetType},
        response::Availability,
        schedule::ScheduleStatus,
    };
    use rstest::rstest;

    fn db_schedule(status: &str) -> DbSchedule {
        DbSchedule {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            title: "Board meeting".to_string(),
            description: String::new(),
            event_id: None,
            public_token: "t".repeat(32),
            status: status.to_string(),
            deadline: None,
            decided_candidate_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn schedule_rows_parse_status() {
        let schedule = Schedule::try_from(db_schedule("closed")).unwrap();
        assert_eq!(schedule.status, ScheduleStatus::Closed);
        assert!(matches!(
            Schedule::try_from(db_schedule("archived")),
            Err(RollcallError::Database(_))
        ));
    }

    #[test]
    fn response_rows_parse_availability() {
        let row = DbScheduleResponse {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            availability: "maybe".to_string(),
            note: String::new(),
            responded_at: Utc::now(),
        };
        let response = ScheduleResponse::try_from(row.clone()).unwrap();
        assert_eq!(response.availability, Availability::Maybe);

        let broken = DbScheduleResponse {
            availability: "perhaps".to_string(),
            ..row
        };
        assert!(matches!(
            ScheduleResponse::try_from(broken),
            Err(RollcallError::Database(_))
        ));
    }

    #[rstest]
    #[case("event", Some(TargetType::Event))]
    #[case("standalone", Some(TargetType::Standalone))]
    #[case("meeting", None)]
    fn collection_rows_parse_target_type(#[case] target_type: &str, #[case] expected: Option<TargetType>) {
        let row = DbAttendanceCollection {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            title: "Practice".to_string(),
            description: String::new(),
            target_type: target_type.to_string(),
            target_id: None,
            public_token: "c".repeat(32),
            deadline: None,
            status: "open".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let parsed = AttendanceCollection::try_from(row).ok();
        assert_eq!(parsed.as_ref().map(|c| c.target_type), expected);
        if let Some(collection) = parsed {
            assert_eq!(collection.status, CollectionStatus::Open);
        }
    }

    #[test]
    fn attendance_rows_keep_time_window() {
        let from = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let row = DbAttendanceResponse {
            id: Uuid::new_v4(),
            collection_id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            target_date_id: Uuid::new_v4(),
            response: "undecided".to_string(),
            note: String::new(),
            available_from: Some(from),
            available_to: None,
            responded_at: Utc::now(),
        };

        let response = AttendanceResponse::try_from(row).unwrap();
        assert_eq!(response.response, ResponseType::Undecided);
        assert_eq!(response.available_from, Some(from));
    }
}
