//! # Response Collection
//!
//! Public submission of member availability. Holding the schedule's public
//! token is the only access check.
//!
//! A batch is all or nothing: a closed or expired schedule, or one invalid
//! availability value, rejects the whole batch. Candidate ids the schedule no
//! longer has are dropped quietly, since a public form may have been loaded
//! before the admin edited the candidates.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::resolve_public_schedule;
use crate::errors::{RollcallError, RollcallResult};
use crate::models::response::{
    Availability, CandidateTally, ResponseListing, ScheduleResponse, SubmitResponsesRequest,
    SubmitResponsesResponse,
};
use crate::repositories::{Clock, TransactionManager};

pub struct ResponseCollector {
    tx: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
}

impl ResponseCollector {
    pub fn new(tx: Arc<dyn TransactionManager>, clock: Arc<dyn Clock>) -> Self {
        Self { tx, clock }
    }

    pub async fn submit(
        &self,
        public_token: &str,
        request: SubmitResponsesRequest,
    ) -> RollcallResult<SubmitResponsesResponse> {
        let now = self.clock.now();
        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();

        let schedule = resolve_public_schedule(repo, public_token).await?;
        if !schedule.can_respond(now) {
            return Err(RollcallError::Conflict(
                "Schedule is not accepting responses".to_string(),
            ));
        }
        if request.responses.is_empty() {
            return Err(RollcallError::Validation(
                "At least one response is required".to_string(),
            ));
        }

        let known: HashSet<Uuid> = repo
            .list_candidates(schedule.tenant_id, schedule.id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        // Validate everything before the first write.
        let mut rows = Vec::with_capacity(request.responses.len());
        let mut skipped = 0usize;
        for entry in request.responses {
            if !known.contains(&entry.candidate_id) {
                skipped += 1;
                continue;
            }
            let availability: Availability = entry.availability.parse()?;
            rows.push(ScheduleResponse {
                id: Uuid::new_v4(),
                schedule_id: schedule.id,
                member_id: request.member_id,
                candidate_id: entry.candidate_id,
                availability,
                note: entry.note,
                responded_at: now,
            });
        }

        if skipped > 0 {
            warn!(
                "Dropped {} response(s) for unknown candidates on schedule {}",
                skipped, schedule.id
            );
        }

        for row in &rows {
            repo.upsert_response(schedule.tenant_id, row).await?;
        }
        uow.commit().await?;

        info!(
            "Responses submitted: schedule={}, member={}, rows={}",
            schedule.id,
            request.member_id,
            rows.len()
        );

        Ok(SubmitResponsesResponse {
            schedule_id: schedule.id,
            member_id: request.member_id,
            responded_at: now,
        })
    }

    /// Read-only listing for public token holders.
    pub async fn list_responses(&self, public_token: &str) -> RollcallResult<ResponseListing> {
        let mut uow = self.tx.begin().await?;
        let repo = uow.schedules();
        let schedule = resolve_public_schedule(repo, public_token).await?;
        let candidates = repo
            .list_candidates(schedule.tenant_id, schedule.id)
            .await?;
        let responses = repo
            .list_responses(schedule.tenant_id, schedule.id)
            .await?;
        uow.commit().await?;

        let mut tallies: HashMap<Uuid, CandidateTally> = candidates
            .iter()
            .map(|c| {
                (
                    c.id,
                    CandidateTally {
                        candidate_id: c.id,
                        ..Default::default()
                    },
                )
            })
            .collect();
        for response in &responses {
            if let Some(tally) = tallies.get_mut(&response.candidate_id) {
                match response.availability {
                    Availability::Available => tally.available += 1,
                    Availability::Unavailable => tally.unavailable += 1,
                    Availability::Maybe => tally.maybe += 1,
                }
            }
        }

        Ok(ResponseListing {
            schedule_id: schedule.id,
            responses,
            tallies: candidates
                .iter()
                .filter_map(|c| tallies.remove(&c.id))
                .collect(),
        })
    }
}
