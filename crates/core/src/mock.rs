//! In-memory implementations of the repository contracts for tests.
//!
//! A unit of work operates on a private copy of the store and publishes it
//! on commit, so dropped or failed units leave the store untouched. Commits
//! are not isolated from each other: the last one wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::eyre;
use tokio::sync::Mutex;
use uuid::Uuid;

pub use crate::repositories::{MockClock, MockMemberGroupRepository};

use crate::errors::{RollcallError, RollcallResult};
use crate::models::{
    attendance::{AttendanceCollection, AttendanceResponse, TargetDate},
    candidate::CandidateDate,
    group::{CollectionGroupAssignment, ScheduleGroupAssignment},
    response::ScheduleResponse,
    schedule::Schedule,
};
use crate::repositories::{
    AttendanceRepository, Clock, MemberGroupRepository, ScheduleRepository, TransactionManager,
    UnitOfWork,
};

/// Write operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    SaveCandidates,
    UpsertScheduleResponse,
    InsertTargetDates,
    UpsertAttendanceResponses,
}

#[derive(Debug, Clone)]
struct Tenanted<T> {
    tenant_id: Uuid,
    row: T,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    schedules: Vec<Schedule>,
    candidates: Vec<Tenanted<CandidateDate>>,
    schedule_groups: Vec<Tenanted<ScheduleGroupAssignment>>,
    responses: Vec<Tenanted<ScheduleResponse>>,
    collections: Vec<AttendanceCollection>,
    target_dates: Vec<Tenanted<TargetDate>>,
    collection_groups: Vec<Tenanted<CollectionGroupAssignment>>,
    attendance_responses: Vec<Tenanted<AttendanceResponse>>,
    group_members: HashMap<(Uuid, Uuid), Vec<Uuid>>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_on: Arc<Mutex<Option<FailPoint>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later unit of work fail at `point`.
    pub async fn fail_on(&self, point: FailPoint) {
        *self.fail_on.lock().await = Some(point);
    }

    pub async fn set_group_members(&self, tenant_id: Uuid, group_id: Uuid, members: Vec<Uuid>) {
        self.state
            .lock()
            .await
            .group_members
            .insert((tenant_id, group_id), members);
    }

    pub async fn schedules(&self) -> Vec<Schedule> {
        self.state.lock().await.schedules.clone()
    }

    pub async fn candidates(&self, schedule_id: Uuid) -> Vec<CandidateDate> {
        let state = self.state.lock().await;
        sorted_candidates(&state, None, schedule_id)
    }

    pub async fn schedule_responses(&self) -> Vec<ScheduleResponse> {
        let state = self.state.lock().await;
        state.responses.iter().map(|r| r.row.clone()).collect()
    }

    pub async fn collections(&self) -> Vec<AttendanceCollection> {
        self.state.lock().await.collections.clone()
    }

    pub async fn target_dates(&self) -> Vec<TargetDate> {
        let state = self.state.lock().await;
        state.target_dates.iter().map(|t| t.row.clone()).collect()
    }

    pub async fn attendance_responses(&self) -> Vec<AttendanceResponse> {
        let state = self.state.lock().await;
        state
            .attendance_responses
            .iter()
            .map(|r| r.row.clone())
            .collect()
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    async fn begin(&self) -> RollcallResult<Box<dyn UnitOfWork>> {
        let snapshot = self.state.lock().await.clone();
        let fail_on = *self.fail_on.lock().await;
        Ok(Box::new(MemoryUnitOfWork {
            working: snapshot,
            shared: Arc::clone(&self.state),
            fail_on,
        }))
    }
}

#[async_trait]
impl MemberGroupRepository for InMemoryStore {
    async fn member_ids(&self, tenant_id: Uuid, group_id: Uuid) -> RollcallResult<Vec<Uuid>> {
        Ok(self
            .state
            .lock()
            .await
            .group_members
            .get(&(tenant_id, group_id))
            .cloned()
            .unwrap_or_default())
    }
}

pub struct MemoryUnitOfWork {
    working: MemoryState,
    shared: Arc<Mutex<MemoryState>>,
    fail_on: Option<FailPoint>,
}

impl MemoryUnitOfWork {
    fn check(&self, point: FailPoint) -> RollcallResult<()> {
        if self.fail_on == Some(point) {
            return Err(RollcallError::Database(eyre!(
                "injected failure at {:?}",
                point
            )));
        }
        Ok(())
    }

    fn owns_schedule(&self, tenant_id: Uuid, schedule_id: Uuid) -> bool {
        self.working
            .schedules
            .iter()
            .any(|s| s.id == schedule_id && s.tenant_id == tenant_id)
    }
}

fn sorted_candidates(
    state: &MemoryState,
    tenant_id: Option<Uuid>,
    schedule_id: Uuid,
) -> Vec<CandidateDate> {
    let mut candidates: Vec<CandidateDate> = state
        .candidates
        .iter()
        .filter(|c| c.row.schedule_id == schedule_id)
        .filter(|c| tenant_id.is_none_or(|t| t == c.tenant_id))
        .map(|c| c.row.clone())
        .collect();
    candidates.sort_by_key(|c| c.display_order);
    candidates
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn schedules(&mut self) -> &mut dyn ScheduleRepository {
        self
    }

    fn attendance(&mut self) -> &mut dyn AttendanceRepository {
        self
    }

    async fn commit(self: Box<Self>) -> RollcallResult<()> {
        *self.shared.lock().await = self.working;
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MemoryUnitOfWork {
    async fn insert_schedule(&mut self, schedule: &Schedule) -> RollcallResult<()> {
        if self
            .working
            .schedules
            .iter()
            .any(|s| s.public_token == schedule.public_token)
        {
            return Err(RollcallError::Database(eyre!("duplicate public token")));
        }
        self.working.schedules.push(schedule.clone());
        Ok(())
    }

    async fn update_schedule(&mut self, schedule: &Schedule) -> RollcallResult<()> {
        let stored = self
            .working
            .schedules
            .iter_mut()
            .find(|s| s.id == schedule.id && s.tenant_id == schedule.tenant_id)
            .ok_or_else(|| RollcallError::Database(eyre!("schedule {} missing", schedule.id)))?;
        *stored = schedule.clone();
        Ok(())
    }

    async fn find_schedule(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Option<Schedule>> {
        Ok(self
            .working
            .schedules
            .iter()
            .find(|s| s.id == schedule_id && s.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_schedule_by_token(&mut self, token: &str) -> RollcallResult<Option<Schedule>> {
        Ok(self
            .working
            .schedules
            .iter()
            .find(|s| s.public_token == token)
            .cloned())
    }

    async fn list_schedules(&mut self, tenant_id: Uuid) -> RollcallResult<Vec<Schedule>> {
        let mut schedules: Vec<Schedule> = self
            .working
            .schedules
            .iter()
            .filter(|s| s.tenant_id == tenant_id && !s.is_deleted())
            .cloned()
            .collect();
        schedules.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(schedules)
    }

    async fn list_candidates(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<CandidateDate>> {
        Ok(sorted_candidates(&self.working, Some(tenant_id), schedule_id))
    }

    async fn save_candidates(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        candidates: &[CandidateDate],
        removed: &[Uuid],
    ) -> RollcallResult<()> {
        self.check(FailPoint::SaveCandidates)?;
        let state = &mut self.working;
        state
            .responses
            .retain(|r| !removed.contains(&r.row.candidate_id));
        state.candidates.retain(|c| {
            c.row.schedule_id != schedule_id || c.tenant_id != tenant_id
        });
        state
            .candidates
            .extend(candidates.iter().cloned().map(|row| Tenanted { tenant_id, row }));
        Ok(())
    }

    async fn list_group_assignments(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<ScheduleGroupAssignment>> {
        Ok(self
            .working
            .schedule_groups
            .iter()
            .filter(|a| a.tenant_id == tenant_id && a.row.schedule_id == schedule_id)
            .map(|a| a.row.clone())
            .collect())
    }

    async fn replace_group_assignments(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        assignments: &[ScheduleGroupAssignment],
    ) -> RollcallResult<()> {
        let groups = &mut self.working.schedule_groups;
        groups.retain(|a| a.tenant_id != tenant_id || a.row.schedule_id != schedule_id);
        groups.extend(
            assignments
                .iter()
                .cloned()
                .map(|row| Tenanted { tenant_id, row }),
        );
        Ok(())
    }

    async fn find_responded_candidate(
        &mut self,
        tenant_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> RollcallResult<Option<Uuid>> {
        Ok(self
            .working
            .responses
            .iter()
            .find(|r| r.tenant_id == tenant_id && candidate_ids.contains(&r.row.candidate_id))
            .map(|r| r.row.candidate_id))
    }

    async fn upsert_response(
        &mut self,
        tenant_id: Uuid,
        response: &ScheduleResponse,
    ) -> RollcallResult<()> {
        self.check(FailPoint::UpsertScheduleResponse)?;
        if !self.owns_schedule(tenant_id, response.schedule_id) {
            return Err(RollcallError::Database(eyre!("schedule {} missing", response.schedule_id)));
        }
        let existing = self.working.responses.iter_mut().find(|r| {
            r.row.schedule_id == response.schedule_id
                && r.row.member_id == response.member_id
                && r.row.candidate_id == response.candidate_id
        });
        match existing {
            Some(stored) => {
                stored.row.availability = response.availability;
                stored.row.note = response.note.clone();
                stored.row.responded_at = response.responded_at;
            }
            None => self.working.responses.push(Tenanted {
                tenant_id,
                row: response.clone(),
            }),
        }
        Ok(())
    }

    async fn list_responses(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<ScheduleResponse>> {
        Ok(self
            .working
            .responses
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.row.schedule_id == schedule_id)
            .map(|r| r.row.clone())
            .collect())
    }
}

#[async_trait]
impl AttendanceRepository for MemoryUnitOfWork {
    async fn insert_collection(&mut self, collection: &AttendanceCollection) -> RollcallResult<()> {
        self.working.collections.push(collection.clone());
        Ok(())
    }

    async fn insert_target_dates(
        &mut self,
        tenant_id: Uuid,
        target_dates: &[TargetDate],
    ) -> RollcallResult<()> {
        self.check(FailPoint::InsertTargetDates)?;
        self.working.target_dates.extend(
            target_dates
                .iter()
                .cloned()
                .map(|row| Tenanted { tenant_id, row }),
        );
        Ok(())
    }

    async fn insert_group_assignments(
        &mut self,
        tenant_id: Uuid,
        assignments: &[CollectionGroupAssignment],
    ) -> RollcallResult<()> {
        self.working.collection_groups.extend(
            assignments
                .iter()
                .cloned()
                .map(|row| Tenanted { tenant_id, row }),
        );
        Ok(())
    }

    async fn upsert_responses(
        &mut self,
        tenant_id: Uuid,
        responses: &[AttendanceResponse],
    ) -> RollcallResult<()> {
        self.check(FailPoint::UpsertAttendanceResponses)?;
        for response in responses {
            let rows = &mut self.working.attendance_responses;
            match rows.iter_mut().find(|r| {
                r.row.collection_id == response.collection_id
                    && r.row.member_id == response.member_id
                    && r.row.target_date_id == response.target_date_id
            }) {
                Some(stored) => stored.row = response.clone(),
                None => rows.push(Tenanted {
                    tenant_id,
                    row: response.clone(),
                }),
            }
        }
        Ok(())
    }

    async fn find_collection(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Option<AttendanceCollection>> {
        Ok(self
            .working
            .collections
            .iter()
            .find(|c| c.id == collection_id && c.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_target_dates(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<TargetDate>> {
        let mut dates: Vec<TargetDate> = self
            .working
            .target_dates
            .iter()
            .filter(|t| t.tenant_id == tenant_id && t.row.collection_id == collection_id)
            .map(|t| t.row.clone())
            .collect();
        dates.sort_by_key(|t| t.display_order);
        Ok(dates)
    }

    async fn list_collection_group_assignments(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<CollectionGroupAssignment>> {
        Ok(self
            .working
            .collection_groups
            .iter()
            .filter(|a| a.tenant_id == tenant_id && a.row.collection_id == collection_id)
            .map(|a| a.row.clone())
            .collect())
    }

    async fn list_attendance_responses(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<AttendanceResponse>> {
        Ok(self
            .working
            .attendance_responses
            .iter()
            .filter(|r| r.tenant_id == tenant_id && r.row.collection_id == collection_id)
            .map(|r| r.row.clone())
            .collect())
    }
}

/// A clock tests can move by hand.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
