use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGroupAssignment {
    pub schedule_id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Copied from a [`ScheduleGroupAssignment`] at conversion time, not linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionGroupAssignment {
    pub collection_id: Uuid,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}
