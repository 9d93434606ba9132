//! PostgreSQL units of work. Each unit wraps one `sqlx` transaction; sqlx
//! rolls the transaction back when it is dropped uncommitted.

use async_trait::async_trait;
use eyre::WrapErr;
use rollcall_core::{
    errors::RollcallResult,
    models::{
        attendance::{AttendanceCollection, AttendanceResponse, TargetDate},
        candidate::CandidateDate,
        group::{CollectionGroupAssignment, ScheduleGroupAssignment},
        response::ScheduleResponse,
        schedule::Schedule,
    },
    repositories::{AttendanceRepository, ScheduleRepository, TransactionManager, UnitOfWork},
};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::DbPool;
use crate::repositories::{attendance, schedule};

#[derive(Clone)]
pub struct PgTransactionManager {
    pool: DbPool,
}

impl PgTransactionManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> RollcallResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .wrap_err("Failed to begin transaction")?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn schedules(&mut self) -> &mut dyn ScheduleRepository {
        self
    }

    fn attendance(&mut self) -> &mut dyn AttendanceRepository {
        self
    }

    async fn commit(self: Box<Self>) -> RollcallResult<()> {
        let uow = *self;
        uow.tx
            .commit()
            .await
            .wrap_err("Failed to commit transaction")?;
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for PgUnitOfWork {
    async fn insert_schedule(&mut self, schedule: &Schedule) -> RollcallResult<()> {
        schedule::insert_schedule(&mut self.tx, schedule).await
    }

    async fn update_schedule(&mut self, schedule: &Schedule) -> RollcallResult<()> {
        schedule::update_schedule(&mut self.tx, schedule).await
    }

    async fn find_schedule(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Option<Schedule>> {
        schedule::find_schedule(&mut self.tx, tenant_id, schedule_id).await
    }

    async fn find_schedule_by_token(&mut self, token: &str) -> RollcallResult<Option<Schedule>> {
        schedule::find_schedule_by_token(&mut self.tx, token).await
    }

    async fn list_schedules(&mut self, tenant_id: Uuid) -> RollcallResult<Vec<Schedule>> {
        schedule::list_schedules(&mut self.tx, tenant_id).await
    }

    async fn list_candidates(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<CandidateDate>> {
        schedule::list_candidates(&mut self.tx, tenant_id, schedule_id).await
    }

    async fn save_candidates(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        candidates: &[CandidateDate],
        removed: &[Uuid],
    ) -> RollcallResult<()> {
        schedule::save_candidates(&mut self.tx, tenant_id, schedule_id, candidates, removed).await
    }

    async fn list_group_assignments(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<ScheduleGroupAssignment>> {
        schedule::list_group_assignments(&mut self.tx, tenant_id, schedule_id).await
    }

    async fn replace_group_assignments(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        assignments: &[ScheduleGroupAssignment],
    ) -> RollcallResult<()> {
        schedule::replace_group_assignments(&mut self.tx, tenant_id, schedule_id, assignments)
            .await
    }

    async fn find_responded_candidate(
        &mut self,
        tenant_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> RollcallResult<Option<Uuid>> {
        schedule::find_responded_candidate(&mut self.tx, tenant_id, candidate_ids).await
    }

    async fn upsert_response(
        &mut self,
        tenant_id: Uuid,
        response: &ScheduleResponse,
    ) -> RollcallResult<()> {
        schedule::upsert_response(&mut self.tx, tenant_id, response).await
    }

    async fn list_responses(
        &mut self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Vec<ScheduleResponse>> {
        schedule::list_responses(&mut self.tx, tenant_id, schedule_id).await
    }
}

#[async_trait]
impl AttendanceRepository for PgUnitOfWork {
    async fn insert_collection(&mut self, collection: &AttendanceCollection) -> RollcallResult<()> {
        attendance::insert_collection(&mut self.tx, collection).await
    }

    async fn insert_target_dates(
        &mut self,
        tenant_id: Uuid,
        target_dates: &[TargetDate],
    ) -> RollcallResult<()> {
        attendance::insert_target_dates(&mut self.tx, tenant_id, target_dates).await
    }

    async fn insert_group_assignments(
        &mut self,
        tenant_id: Uuid,
        assignments: &[CollectionGroupAssignment],
    ) -> RollcallResult<()> {
        attendance::insert_group_assignments(&mut self.tx, tenant_id, assignments).await
    }

    async fn upsert_responses(
        &mut self,
        tenant_id: Uuid,
        responses: &[AttendanceResponse],
    ) -> RollcallResult<()> {
        attendance::upsert_responses(&mut self.tx, tenant_id, responses).await
    }

    async fn find_collection(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Option<AttendanceCollection>> {
        attendance::find_collection(&mut self.tx, tenant_id, collection_id).await
    }

    async fn list_target_dates(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<TargetDate>> {
        attendance::list_target_dates(&mut self.tx, tenant_id, collection_id).await
    }

    async fn list_collection_group_assignments(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<CollectionGroupAssignment>> {
        attendance::list_group_assignments(&mut self.tx, tenant_id, collection_id).await
    }

    async fn list_attendance_responses(
        &mut self,
        tenant_id: Uuid,
        collection_id: Uuid,
    ) -> RollcallResult<Vec<AttendanceResponse>> {
        attendance::list_responses(&mut self.tx, tenant_id, collection_id).await
    }
}
