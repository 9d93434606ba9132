//! # Candidate Reconciliation
//!
//! An update carries the complete desired candidate list without ids. The
//! stored candidates are matched to it by [`CandidateKey`] (date plus time
//! window): a match keeps its id and creation time and takes the new
//! position, anything unmatched is new, and stored candidates missing from
//! the desired list are removed.
//!
//! Removal is guarded. If a removed candidate already has responses the
//! update is refused unless the caller forces it, in which case the
//! responses go with the candidate.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{RollcallError, RollcallResult};
use crate::models::candidate::{CandidateDate, CandidateInput, CandidateKey};
use crate::repositories::ScheduleRepository;

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The new candidate set, in desired display order
    pub candidates: Vec<CandidateDate>,
    /// Stored candidates that are no longer wanted
    pub removed: Vec<CandidateDate>,
}

impl Reconciliation {
    pub fn removed_ids(&self) -> Vec<Uuid> {
        self.removed.iter().map(|c| c.id).collect()
    }

    /// Fails with a conflict naming the affected date when a removed
    /// candidate has responses and `force` is not set.
    pub async fn ensure_removable(
        &self,
        repo: &mut dyn ScheduleRepository,
        tenant_id: Uuid,
        force: bool,
    ) -> RollcallResult<()> {
        if self.removed.is_empty() || force {
            return Ok(());
        }

        let removed_ids = self.removed_ids();
        let Some(blocking) = repo.find_responded_candidate(tenant_id, &removed_ids).await? else {
            return Ok(());
        };

        let date = self
            .removed
            .iter()
            .find(|c| c.id == blocking)
            .map(|c| c.date.to_string())
            .unwrap_or_else(|| blocking.to_string());

        Err(RollcallError::Conflict(format!(
            "Candidate {} already has responses; resubmit with force to remove it",
            date
        )))
    }
}

/// Rejects candidate lists that cannot be reconciled unambiguously.
pub fn validate_candidates(inputs: &[CandidateInput]) -> RollcallResult<()> {
    if inputs.is_empty() {
        return Err(RollcallError::Validation(
            "At least one candidate date is required".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(inputs.len());
    for input in inputs {
        if let (Some(start), Some(end)) = (input.start_time, input.end_time) {
            if end <= start {
                return Err(RollcallError::Validation(format!(
                    "Candidate {} ends before it starts",
                    input.date
                )));
            }
        }
        if !seen.insert(input.key()) {
            return Err(RollcallError::Validation(format!(
                "Candidate {} is listed more than once",
                input.date
            )));
        }
    }

    Ok(())
}

/// Builds the new candidate set for `schedule_id`. Pure: nothing is read or
/// written here.
pub fn reconcile(
    schedule_id: Uuid,
    existing: &[CandidateDate],
    desired: &[CandidateInput],
    now: DateTime<Utc>,
) -> Reconciliation {
    let mut by_key: HashMap<CandidateKey, &CandidateDate> =
        existing.iter().map(|c| (c.key(), c)).collect();

    let mut candidates = Vec::with_capacity(desired.len());
    for (position, input) in desired.iter().enumerate() {
        let display_order = position as i32;
        let candidate = match by_key.remove(&input.key()) {
            Some(current) => CandidateDate {
                display_order,
                ..current.clone()
            },
            None => CandidateDate {
                id: Uuid::new_v4(),
                schedule_id,
                date: input.date,
                start_time: input.start_time,
                end_time: input.end_time,
                display_order,
                created_at: now,
            },
        };
        candidates.push(candidate);
    }

    // Whatever is left in the map was not asked for again.
    let kept: HashSet<Uuid> = candidates.iter().map(|c| c.id).collect();
    let removed: Vec<CandidateDate> = existing
        .iter()
        .filter(|c| !kept.contains(&c.id))
        .cloned()
        .collect();

    debug!(
        "Reconciled candidates for schedule {}: {} desired, {} removed",
        schedule_id,
        candidates.len(),
        removed.len()
    );

    Reconciliation {
        candidates,
        removed,
    }
}
