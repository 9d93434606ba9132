use async_trait::async_trait;
use eyre::WrapErr;
use rollcall_core::{errors::RollcallResult, repositories::MemberGroupRepository};
use uuid::Uuid;

use crate::DbPool;

/// Reads group membership straight from the pool, outside any unit of work.
#[derive(Clone)]
pub struct PgMemberGroupRepository {
    pool: DbPool,
}

impl PgMemberGroupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberGroupRepository for PgMemberGroupRepository {
    async fn member_ids(&self, tenant_id: Uuid, group_id: Uuid) -> RollcallResult<Vec<Uuid>> {
        let members = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT member_id
            FROM member_group_members
            WHERE tenant_id = $1 AND group_id = $2
            ORDER BY member_id ASC
            "#,
        )
        .bind(tenant_id)
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .wrap_err("Failed to load group members")?;

        Ok(members)
    }
}
