//! # Attendance Conversion
//!
//! Turns a coordination schedule into a new, independent attendance
//! collection. The admin picks which candidates to carry over; each becomes
//! a target date with its own id.
//!
//! The members tracked on a target date are the union of those who answered
//! the candidate and those in any group assigned to the schedule. Answers
//! are carried over with their note and original time:
//!
//! | availability | response  |
//! |--------------|-----------|
//! | available    | attending |
//! | unavailable  | absent    |
//! | maybe        | undecided |
//! | no answer    | undecided |
//!
//! Members without an answer get an empty note stamped with the conversion
//! time. Everything is written in one transaction.
//!
//! Converting the same schedule twice yields two collections.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::load_schedule;
use crate::errors::{RollcallError, RollcallResult};
use crate::models::{
    attendance::{
        AttendanceCollection, AttendanceResponse, CollectionDetail, CollectionStatus,
        ConvertToAttendanceRequest, ConvertToAttendanceResponse, ResponseType, TargetDate,
        TargetType,
    },
    group::CollectionGroupAssignment,
    response::ScheduleResponse,
};
use crate::repositories::{Clock, MemberGroupRepository, TransactionManager};
use crate::token::generate_public_token;

pub struct AttendanceConverter {
    tx: Arc<dyn TransactionManager>,
    groups: Arc<dyn MemberGroupRepository>,
    clock: Arc<dyn Clock>,
}

impl AttendanceConverter {
    pub fn new(
        tx: Arc<dyn TransactionManager>,
        groups: Arc<dyn MemberGroupRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { tx, groups, clock }
    }

    pub async fn convert(
        &self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        request: ConvertToAttendanceRequest,
    ) -> RollcallResult<ConvertToAttendanceResponse> {
        if request.candidate_ids.is_empty() {
            return Err(RollcallError::Validation(
                "Select at least one candidate to convert".to_string(),
            ));
        }

        let now = self.clock.now();
        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();

        let schedule = load_schedule(repo, tenant_id, schedule_id, false).await?;
        let candidates = repo.list_candidates(tenant_id, schedule_id).await?;

        // Unknown ids are an error here, unlike public submission.
        let requested: HashSet<Uuid> = request.candidate_ids.iter().copied().collect();
        if let Some(unknown) = request
            .candidate_ids
            .iter()
            .find(|id| !candidates.iter().any(|c| c.id == **id))
        {
            return Err(RollcallError::Validation(format!(
                "Candidate {} does not belong to schedule {}",
                unknown, schedule_id
            )));
        }

        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| schedule.title.clone());

        let collection = AttendanceCollection {
            id: Uuid::new_v4(),
            tenant_id,
            title: title.clone(),
            description: schedule.description.clone(),
            target_type: if schedule.event_id.is_some() {
                TargetType::Event
            } else {
                TargetType::Standalone
            },
            target_id: schedule.event_id,
            public_token: generate_public_token(),
            deadline: schedule.deadline,
            status: CollectionStatus::Open,
            created_at: now,
            updated_at: now,
        };

        // Candidates are already in display order; keep it.
        let mut target_for_candidate: Vec<(Uuid, Uuid)> = Vec::new();
        let mut target_dates = Vec::with_capacity(requested.len());
        for candidate in candidates.iter().filter(|c| requested.contains(&c.id)) {
            let target = TargetDate {
                id: Uuid::new_v4(),
                collection_id: collection.id,
                date: candidate.date,
                start_time: candidate.start_time.map(truncate_to_minute),
                end_time: candidate.end_time.map(truncate_to_minute),
                display_order: target_dates.len() as i32,
                created_at: now,
            };
            target_for_candidate.push((candidate.id, target.id));
            target_dates.push(target);
        }

        let group_assignments: Vec<CollectionGroupAssignment> = repo
            .list_group_assignments(tenant_id, schedule_id)
            .await?
            .into_iter()
            .map(|a| CollectionGroupAssignment {
                collection_id: collection.id,
                group_id: a.group_id,
                created_at: now,
            })
            .collect();

        let mut group_members = BTreeSet::new();
        for assignment in &group_assignments {
            let members = self
                .groups
                .member_ids(tenant_id, assignment.group_id)
                .await?;
            group_members.extend(members);
        }

        let schedule_responses = repo.list_responses(tenant_id, schedule_id).await?;
        let responses = build_responses(
            collection.id,
            &target_for_candidate,
            &schedule_responses,
            &group_members,
            now,
        );

        debug!(
            "Converting schedule {}: {} target dates, {} group members, {} responses",
            schedule_id,
            target_dates.len(),
            group_members.len(),
            responses.len()
        );

        let attendance = uow.attendance();
        attendance.insert_collection(&collection).await?;
        attendance.insert_target_dates(tenant_id, &target_dates).await?;
        attendance
            .insert_group_assignments(tenant_id, &group_assignments)
            .await?;
        attendance.upsert_responses(tenant_id, &responses).await?;
        uow.commit().await?;

        info!(
            "Schedule {} converted to attendance collection {} ({} target dates, {} responses)",
            schedule_id,
            collection.id,
            target_dates.len(),
            responses.len()
        );

        Ok(ConvertToAttendanceResponse {
            collection_id: collection.id,
            public_token: collection.public_token,
            title,
        })
    }

    pub async fn get_collection(
        &self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<CollectionDetail> {
        let mut uow = self.tx.begin().await?;
        let repo = uow.attendance();
        let collection = repo
            .find_collection(tenant_id, collection_id)
            .await?
            .ok_or_else(|| {
                RollcallError::NotFound(format!(
                    "Attendance collection with ID {} not found",
                    collection_id
                ))
            })?;
        let target_dates = repo.list_target_dates(tenant_id, collection_id).await?;
        let group_ids = repo
            .list_collection_group_assignments(tenant_id, collection_id)
            .await?
            .into_iter()
            .map(|a| a.group_id)
            .collect();
        let responses = repo
            .list_attendance_responses(tenant_id, collection_id)
            .await?;
        uow.commit().await?;

        Ok(CollectionDetail {
            collection,
            target_dates,
            group_ids,
            responses,
        })
    }
}

/// One row per (target date, member) over responders of the candidate plus
/// every group member.
fn build_responses(
    collection_id: Uuid,
    target_for_candidate: &[(Uuid, Uuid)],
    schedule_responses: &[ScheduleResponse],
    group_members: &BTreeSet<Uuid>,
    now: DateTime<Utc>,
) -> Vec<AttendanceResponse> {
    let mut answered: HashMap<Uuid, HashMap<Uuid, &ScheduleResponse>> = HashMap::new();
    for response in schedule_responses {
        if target_for_candidate
            .iter()
            .any(|(candidate_id, _)| *candidate_id == response.candidate_id)
        {
            answered
                .entry(response.candidate_id)
                .or_default()
                .insert(response.member_id, response);
        }
    }

    let mut rows = Vec::new();
    for (candidate_id, target_date_id) in target_for_candidate {
        let by_member = answered.remove(candidate_id).unwrap_or_default();
        let population: BTreeSet<Uuid> = by_member
            .keys()
            .copied()
            .chain(group_members.iter().copied())
            .collect();

        for member_id in population {
            let row = match by_member.get(&member_id) {
                Some(answer) => AttendanceResponse {
                    id: Uuid::new_v4(),
                    collection_id,
                    member_id,
                    target_date_id: *target_date_id,
                    response: ResponseType::from(Some(answer.availability)),
                    note: answer.note.clone(),
                    available_from: None,
                    available_to: None,
                    responded_at: answer.responded_at,
                },
                None => AttendanceResponse {
                    id: Uuid::new_v4(),
                    collection_id,
                    member_id,
                    target_date_id: *target_date_id,
                    response: ResponseType::from(None),
                    note: String::new(),
                    available_from: None,
                    available_to: None,
                    responded_at: now,
                },
            };
            rows.push(row);
        }
    }
    rows
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::response::Availability;
    use chrono::TimeZone;

    #[test]
    fn truncates_seconds_and_fractions() {
        let t = NaiveTime::from_hms_milli_opt(18, 30, 59, 999).unwrap();
        assert_eq!(truncate_to_minute(t), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    }

    #[test]
    fn population_is_union_without_duplicates() {
        let collection_id = Uuid::new_v4();
        let candidate = Uuid::new_v4();
        let target = Uuid::new_v4();
        let in_group_and_answered = Uuid::new_v4();
        let answered_only = Uuid::new_v4();
        let group_only = Uuid::new_v4();
        let answered_at = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 30, 12, 0, 0).unwrap();

        let answer = |member_id, availability| ScheduleResponse {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            member_id,
            candidate_id: candidate,
            availability,
            note: "note".to_string(),
            responded_at: answered_at,
        };
        let responses = vec![
            answer(in_group_and_answered, Availability::Available),
            answer(answered_only, Availability::Maybe),
        ];
        let group: BTreeSet<Uuid> = [in_group_and_answered, group_only].into_iter().collect();
        let targets = [(candidate, target)];

        let rows = build_responses(collection_id, &targets, &responses, &group, now);

        assert_eq!(rows.len(), 3);
        let by_member: HashMap<Uuid, &AttendanceResponse> =
            rows.iter().map(|r| (r.member_id, r)).collect();
        assert_eq!(by_member[&in_group_and_answered].response, ResponseType::Attending);
        assert_eq!(by_member[&in_group_and_answered].responded_at, answered_at);
        assert_eq!(by_member[&answered_only].response, ResponseType::Undecided);
        assert_eq!(by_member[&answered_only].note, "note");
        assert_eq!(by_member[&group_only].response, ResponseType::Undecided);
        assert_eq!(by_member[&group_only].responded_at, now);
        assert_eq!(by_member[&group_only].note, "");
        assert!(rows.iter().all(|r| r.target_date_id == target));
    }

    #[test]
    fn responses_to_unselected_candidates_are_ignored() {
        let candidate = Uuid::new_v4();
        let other = Uuid::new_v4();
        let responses = vec![ScheduleResponse {
            id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            candidate_id: other,
            availability: Availability::Available,
            note: String::new(),
            responded_at: Utc::now(),
        }];
        let targets = [(candidate, Uuid::new_v4())];

        let rows = build_responses(Uuid::new_v4(), &targets, &responses, &BTreeSet::new(), Utc::now());
        assert!(rows.is_empty());
    }
}
