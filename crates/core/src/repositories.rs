//! # Repository Contracts
//!
//! Persistence is reached only through the traits in this module. Every call
//! is qualified by the tenant id.
//!
//! Writes that must land together go through a [`UnitOfWork`] obtained from
//! a [`TransactionManager`]. A unit of work that is dropped without
//! [`UnitOfWork::commit`] rolls back, so a use case can bail out with `?` at
//! any step and leave nothing behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::RollcallResult;
use crate::models::{
    attendance::{AttendanceCollection, AttendanceResponse, TargetDate},
    candidate::CandidateDate,
    group::{CollectionGroupAssignment, ScheduleGroupAssignment},
    response::ScheduleResponse,
    schedule::Schedule,
};

#[async_trait]
pub trait ScheduleRepository: Send {
    async fn insert_schedule(&mut self, schedule: &Schedule) -> RollcallResult<()>;

    async fn update_schedule(&mut self, schedule: &Schedule) -> RollcallResult<()>;

    /// Loads a schedule in any status, including deleted.
    async fn find_schedule(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Option<Schedule>>;

    /// Public tokens are unique across tenants, so the token alone resolves
    /// the schedule and its tenant.
    async fn find_schedule_by_token(&mut self, token: &str) -> RollcallResult<Option<Schedule>>;

    /// Non-deleted schedules, newest first.
    async fn list_schedules(&mut self, tenant_id: Uuid) -> RollcallResult<Vec<Schedule>>;

    /// Candidates in display order.
    async fn list_candidates(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<CandidateDate>>;

    /// Stores `candidates` as the schedule's full candidate set. Candidates
    /// in `removed` are deleted together with their responses.
    async fn save_candidates(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        candidates: &[CandidateDate],
        removed: &[Uuid],
    ) -> RollcallResult<()>;

    async fn list_group_assignments(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<ScheduleGroupAssignment>>;

    async fn replace_group_assignments(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        assignments: &[ScheduleGroupAssignment],
    ) -> RollcallResult<()>;

    /// Returns one of `candidate_ids` that has at least one response.
    async fn find_responded_candidate(
        &mut self,
        tenant_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> RollcallResult<Option<Uuid>>;

    /// Inserts or overwrites the row for (schedule, member, candidate).
    async fn upsert_response(
        &mut self,
        tenant_id: Uuid,
        response: &ScheduleResponse,
    ) -> RollcallResult<()>;

    async fn list_responses(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<ScheduleResponse>>;
}

#[async_trait]
pub trait AttendanceRepository: Send {
    async fn insert_collection(&mut self, collection: &AttendanceCollection) -> RollcallResult<()>;

    async fn insert_target_dates(
        &mut self,
        tenant_id: Uuid,
        target_dates: &[TargetDate],
    ) -> RollcallResult<()>;

    async fn insert_group_assignments(
        &mut self,
        tenant_id: Uuid,
        assignments: &[CollectionGroupAssignment],
    ) -> RollcallResult<()>;

    /// Inserts or overwrites rows keyed by (collection, member, target date).
    async fn upsert_responses(
        &mut self,
        tenant_id: Uuid,
        responses: &[AttendanceResponse],
    ) -> RollcallResult<()>;

    async fn find_collection(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Option<AttendanceCollection>>;

    async fn list_target_dates(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<TargetDate>>;

    async fn list_collection_group_assignments(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<CollectionGroupAssignment>>;

    async fn list_attendance_responses(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<AttendanceResponse>>;
}

/// Resolves a member group to the members it currently contains.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait MemberGroupRepository: Send + Sync {
    async fn member_ids(&self, tenant_id: Uuid, group_id: Uuid) -> RollcallResult<Vec<Uuid>>;
}

/// One database transaction. Dropping it without committing rolls back.
#[async_trait]
pub trait UnitOfWork: Send {
    fn schedules(&mut self) -> &mut dyn ScheduleRepository;

    fn attendance(&mut self) -> &mut dyn AttendanceRepository;

    async fn commit(self: Box<Self>) -> RollcallResult<()>;
}

#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> RollcallResult<Box<dyn UnitOfWork>>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
