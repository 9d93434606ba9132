use eyre::WrapErr;
use rollcall_core::{
    errors::RollcallResult,
    models::{
        attendance::{AttendanceCollection, AttendanceResponse, TargetDate},
        group::CollectionGroupAssignment,
    },
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{
    DbAttendanceCollection, DbAttendanceResponse, DbCollectionGroupAssignment, DbTargetDate,
};

pub async fn insert_collection(
    conn: &mut PgConnection,
    collection: &AttendanceCollection,
) -> RollcallResult<()> {
    tracing::debug!(
        "Creating attendance collection: id={}, tenant={}, target_type={}",
        collection.id,
        collection.tenant_id,
        collection.target_type.as_str()
    );

    sqlx::query(
        r#"
        INSERT INTO attendance_collections (id, tenant_id, title, description, target_type,
                                            target_id, public_token, deadline, status,
                                            created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(collection.id)
    .bind(collection.tenant_id)
    .bind(&collection.title)
    .bind(&collection.description)
    .bind(collection.target_type.as_str())
    .bind(collection.target_id)
    .bind(&collection.public_token)
    .bind(collection.deadline)
    .bind(collection.status.as_str())
    .bind(collection.created_at)
    .bind(collection.updated_at)
    .execute(&mut *conn)
    .await
    .wrap_err("Failed to insert attendance collection")?;

    Ok(())
}

pub async fn insert_target_dates(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    target_dates: &[TargetDate],
) -> RollcallResult<()> {
    for target in target_dates {
        sqlx::query(
            r#"
            INSERT INTO target_dates (id, tenant_id, collection_id, date, start_time, end_time,
                                      display_order, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(target.id)
        .bind(tenant_id)
        .bind(target.collection_id)
        .bind(target.date)
        .bind(target.start_time)
        .bind(target.end_time)
        .bind(target.display_order)
        .bind(target.created_at)
        .execute(&mut *conn)
        .await
        .wrap_err("Failed to insert target date")?;
    }

    Ok(())
}

pub async fn insert_group_assignments(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    assignments: &[CollectionGroupAssignment],
) -> RollcallResult<()> {
    for assignment in assignments {
        sqlx::query(
            r#"
            INSERT INTO collection_group_assignments (tenant_id, collection_id, group_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(tenant_id)
        .bind(assignment.collection_id)
        .bind(assignment.group_id)
        .bind(assignment.created_at)
        .execute(&mut *conn)
        .await
        .wrap_err("Failed to insert collection group assignment")?;
    }

    Ok(())
}

pub async fn upsert_responses(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    responses: &[AttendanceResponse],
) -> RollcallResult<()> {
    tracing::debug!("Upserting {} attendance response(s)", responses.len());

    for response in responses {
        sqlx::query(
            r#"
            INSERT INTO attendance_responses (id, tenant_id, collection_id, member_id,
                                              target_date_id, response, note, available_from,
                                              available_to, responded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (collection_id, member_id, target_date_id)
            DO UPDATE SET response = EXCLUDED.response,
                          note = EXCLUDED.note,
                          available_from = EXCLUDED.available_from,
                          available_to = EXCLUDED.available_to,
                          responded_at = EXCLUDED.responded_at
            "#,
        )
        .bind(response.id)
        .bind(tenant_id)
        .bind(response.collection_id)
        .bind(response.member_id)
        .bind(response.target_date_id)
        .bind(response.response.as_str())
        .bind(&response.note)
        .bind(response.available_from)
        .bind(response.available_to)
        .bind(response.responded_at)
        .execute(&mut *conn)
        .await
        .wrap_err("Failed to upsert attendance response")?;
    }

    Ok(())
}

pub async fn find_collection(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    collection_id: Uuid,
) -> RollcallResult<Option<AttendanceCollection>> {
    let row = sqlx::query_as::<_, DbAttendanceCollection>(
        r#"
        SELECT id, tenant_id, title, description, target_type, target_id, public_token,
               deadline, status, created_at, updated_at
        FROM attendance_collections
        WHERE tenant_id = $1 AND id = $2
        "#,
    )
    .bind(tenant_id)
    .bind(collection_id)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("Failed to load attendance collection")?;

    row.map(AttendanceCollection::try_from).transpose()
}

pub async fn list_target_dates(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    collection_id: Uuid,
) -> RollcallResult<Vec<TargetDate>> {
    let rows = sqlx::query_as::<_, DbTargetDate>(
        r#"
        SELECT id, collection_id, date, start_time, end_time, display_order, created_at
        FROM target_dates
        WHERE tenant_id = $1 AND collection_id = $2
        ORDER BY display_order ASC
        "#,
    )
    .bind(tenant_id)
    .bind(collection_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("Failed to list target dates")?;

    Ok(rows.into_iter().map(TargetDate::from).collect())
}

pub async fn list_group_assignments(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    collection_id: Uuid,
) -> RollcallResult<Vec<CollectionGroupAssignment>> {
    let rows = sqlx::query_as::<_, DbCollectionGroupAssignment>(
        r#"
        SELECT collection_id, group_id, created_at
        FROM collection_group_assignments
        WHERE tenant_id = $1 AND collection_id = $2
        ORDER BY created_at ASC, group_id ASC
        "#,
    )
    .bind(tenant_id)
    .bind(collection_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("Failed to list collection group assignments")?;

    Ok(rows.into_iter().map(CollectionGroupAssignment::from).collect())
}

pub async fn list_responses(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    collection_id: Uuid,
) -> RollcallResult<Vec<AttendanceResponse>> {
    let rows = sqlx::query_as::<_, DbAttendanceResponse>(
        r#"
        SELECT id, collection_id, member_id, target_date_id, response, note,
               available_from, available_to, responded_at
        FROM attendance_responses
        WHERE tenant_id = $1 AND collection_id = $2
        ORDER BY member_id ASC, target_date_id ASC
        "#,
    )
    .bind(tenant_id)
    .bind(collection_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("Failed to list attendance responses")?;

    rows.into_iter().map(AttendanceResponse::try_from).collect()
}
