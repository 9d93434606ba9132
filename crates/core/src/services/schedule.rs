use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{load_schedule, require_title, resolve_public_schedule};
use crate::errors::{RollcallError, RollcallResult};
use crate::models::{
    group::ScheduleGroupAssignment,
    schedule::{
        CreateScheduleRequest, PublicScheduleView, Schedule, ScheduleDetail, ScheduleStatus,
        UpdateScheduleRequest,
    },
};
use crate::reconcile::{reconcile, validate_candidates};
use crate::repositories::{Clock, TransactionManager, UnitOfWork};
use crate::token::generate_public_token;

/// Admin-side lifecycle of coordination schedules.
pub struct ScheduleService {
    tx: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(tx: Arc<dyn TransactionManager>, clock: Arc<dyn Clock>) -> Self {
        Self { tx, clock }
    }

    pub async fn create_schedule(
        &self,
        tenant_id: Uuid,
        request: CreateScheduleRequest,
    ) -> RollcallResult<ScheduleDetail> {
        let title = require_title(&request.title)?;
        validate_candidates(&request.candidates)?;

        let now = self.clock.now();
        let schedule = Schedule {
            id: Uuid::new_v4(),
            tenant_id,
            title,
            description: request.description,
            event_id: request.event_id,
            public_token: generate_public_token(),
            status: ScheduleStatus::Open,
            deadline: request.deadline,
            decided_candidate_id: None,
            created_at: now,
            updated_at: now,
        };
        let candidates = reconcile(schedule.id, &[], &request.candidates, now).candidates;
        let assignments = group_assignments(schedule.id, &request.group_ids, now);

        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();
        repo.insert_schedule(&schedule).await?;
        repo.save_candidates(tenant_id, schedule.id, &candidates, &[])
            .await?;
        repo.replace_group_assignments(tenant_id, schedule.id, &assignments)
            .await?;
        uow.commit().await?;

        info!(
            "Schedule created: id={}, tenant={}, candidates={}",
            schedule.id,
            tenant_id,
            candidates.len()
        );

        Ok(ScheduleDetail {
            schedule,
            candidates,
            group_ids: assignments.into_iter().map(|a| a.group_id).collect(),
        })
    }

    pub async fn get_schedule(
        &self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<ScheduleDetail> {
        let mut uow = self.tx.begin().await?;
        let schedule = load_schedule(uow.schedules(), tenant_id, schedule_id, false).await?;
        let detail = load_detail(uow.as_mut(), schedule).await?;
        uow.commit().await?;
        Ok(detail)
    }

    pub async fn list_schedules(&self, tenant_id: Uuid) -> RollcallResult<Vec<Schedule>> {
        let mut uow = self.tx.begin().await?;
        let schedules = uow.schedules().list_schedules(tenant_id).await?;
        uow.commit().await?;
        Ok(schedules)
    }

    /// Applies the full desired state. Candidate reconciliation, the
    /// removal check and every write share one transaction.
    pub async fn update_schedule(
        &self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        request: UpdateScheduleRequest,
    ) -> RollcallResult<ScheduleDetail> {
        let title = require_title(&request.title)?;
        validate_candidates(&request.candidates)?;
        let now = self.clock.now();

        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();
        let mut schedule = load_schedule(repo, tenant_id, schedule_id, true).await?;
        if schedule.is_deleted() {
            return Err(RollcallError::Conflict("Schedule is deleted".to_string()));
        }

        let existing = repo.list_candidates(tenant_id, schedule_id).await?;
        let reconciliation = reconcile(schedule_id, &existing, &request.candidates, now);
        reconciliation
            .ensure_removable(repo, tenant_id, request.force)
            .await?;

        let removed_ids = reconciliation.removed_ids();
        if let Some(decided) = schedule.decided_candidate_id {
            if removed_ids.contains(&decided) {
                return Err(RollcallError::Conflict(
                    "The decided candidate cannot be removed".to_string(),
                ));
            }
        }

        schedule.title = title;
        schedule.description = request.description;
        schedule.event_id = request.event_id;
        schedule.deadline = request.deadline;
        schedule.updated_at = now;

        repo.update_schedule(&schedule).await?;
        repo.save_candidates(
            tenant_id,
            schedule_id,
            &reconciliation.candidates,
            &removed_ids,
        )
        .await?;
        if let Some(group_ids) = &request.group_ids {
            let assignments = group_assignments(schedule_id, group_ids, now);
            repo.replace_group_assignments(tenant_id, schedule_id, &assignments)
                .await?;
        }
        let group_ids = repo
            .list_group_assignments(tenant_id, schedule_id)
            .await?
            .into_iter()
            .map(|a| a.group_id)
            .collect();
        uow.commit().await?;

        info!(
            "Schedule updated: id={}, candidates={}, removed={}, forced={}",
            schedule_id,
            reconciliation.candidates.len(),
            removed_ids.len(),
            request.force
        );

        Ok(ScheduleDetail {
            schedule,
            candidates: reconciliation.candidates,
            group_ids,
        })
    }

    pub async fn close_schedule(
        &self,
        tenant_id: Uuid,
        schedule_id: Uuid,
    ) -> RollcallResult<Schedule> {
        let now = self.clock.now();
        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();
        let mut schedule = load_schedule(repo, tenant_id, schedule_id, true).await?;
        schedule.close(now)?;
        repo.update_schedule(&schedule).await?;
        uow.commit().await?;

        info!("Schedule closed: id={}", schedule_id);
        Ok(schedule)
    }

    pub async fn decide_schedule(
        &self,
        tenant_id: Uuid,
        schedule_id: Uuid,
        candidate_id: Uuid,
    ) -> RollcallResult<Schedule> {
        let now = self.clock.now();
        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();
        let mut schedule = load_schedule(repo, tenant_id, schedule_id, true).await?;
        let candidates = repo.list_candidates(tenant_id, schedule_id).await?;
        schedule.decide(candidate_id, &candidates, now)?;
        repo.update_schedule(&schedule).await?;
        uow.commit().await?;

        info!(
            "Schedule decided: id={}, candidate={}",
            schedule_id, candidate_id
        );
        Ok(schedule)
    }

    pub async fn delete_schedule(&self, tenant_id: Uuid, schedule_id: Uuid) -> RollcallResult<()> {
        let now = self.clock.now();
        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();
        let mut schedule = load_schedule(repo, tenant_id, schedule_id, true).await?;
        schedule.delete(now)?;
        repo.update_schedule(&schedule).await?;
        uow.commit().await?;

        info!("Schedule deleted: id={}", schedule_id);
        Ok(())
    }

    pub async fn get_public_schedule(&self, public_token: &str) -> RollcallResult<PublicScheduleView> {
        let now = self.clock.now();
        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();
        let schedule = resolve_public_schedule(repo, public_token).await?;
        let candidates = repo
            .list_candidates(schedule.tenant_id, schedule.id)
            .await?;
        uow.commit().await?;

        Ok(PublicScheduleView {
            id: schedule.id,
            accepting_responses: schedule.can_respond(now),
            title: schedule.title,
            description: schedule.description,
            status: schedule.status,
            deadline: schedule.deadline,
            decided_candidate_id: schedule.decided_candidate_id,
            candidates,
        })
    }
}

async fn load_detail(uow: &mut dyn UnitOfWork, schedule: Schedule) -> RollcallResult<ScheduleDetail> {
    let repo = uow.schedules();
    let candidates = repo.list_candidates(schedule.tenant_id, schedule.id).await?;
    let group_ids = repo
        .list_group_assignments(schedule.tenant_id, schedule.id)
        .await?
        .into_iter()
        .map(|a| a.group_id)
        .collect();
    Ok(ScheduleDetail {
        schedule,
        candidates,
        group_ids,
    })
}

fn group_assignments(
    schedule_id: Uuid,
    group_ids: &[Uuid],
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<ScheduleGroupAssignment> {
    let mut seen = std::collections::HashSet::new();
    group_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|&group_id| ScheduleGroupAssignment {
            schedule_id,
            group_id,
            created_at: now,
        })
        .collect()
}
