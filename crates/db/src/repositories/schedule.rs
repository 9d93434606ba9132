use eyre::WrapErr;
use rollcall_core::{
    errors::RollcallResult,
    models::{
        candidate::CandidateDate, group::ScheduleGroupAssignment, response::ScheduleResponse,
        schedule::Schedule,
    },
};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{DbCandidateDate, DbSchedule, DbScheduleGroupAssignment, DbScheduleResponse};

const SCHEDULE_COLUMNS: &str = "id, tenant_id, title, description, event_id, public_token, status, \
     deadline, decided_candidate_id, created_at, updated_at";

pub async fn insert_schedule(conn: &mut PgConnection, schedule: &Schedule) -> RollcallResult<()> {
    tracing::debug!(
        "Creating schedule: id={}, tenant={}, title={}",
        schedule.id,
        schedule.tenant_id,
        schedule.title
    );

    sqlx::query(
        r#"
        INSERT INTO schedules (id, tenant_id, title, description, event_id, public_token, status,
                               deadline, decided_candidate_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(schedule.id)
    .bind(schedule.tenant_id)
    .bind(&schedule.title)
    .bind(&schedule.description)
    .bind(schedule.event_id)
    .bind(&schedule.public_token)
    .bind(schedule.status.as_str())
    .bind(schedule.deadline)
    .bind(schedule.decided_candidate_id)
    .bind(schedule.created_at)
    .bind(schedule.updated_at)
    .execute(&mut *conn)
    .await
    .wrap_err("Failed to insert schedule")?;

    Ok(())
}

pub async fn update_schedule(conn: &mut PgConnection, schedule: &Schedule) -> RollcallResult<()> {
    sqlx::query(
        r#"
        UPDATE schedules
        SET title = $3, description = $4, event_id = $5, status = $6, deadline = $7,
            decided_candidate_id = $8, updated_at = $9
        WHERE tenant_id = $1 AND id = $2
        "#,
    )
    .bind(schedule.tenant_id)
    .bind(schedule.id)
    .bind(&schedule.title)
    .bind(&schedule.description)
    .bind(schedule.event_id)
    .bind(schedule.status.as_str())
    .bind(schedule.deadline)
    .bind(schedule.decided_candidate_id)
    .bind(schedule.updated_at)
    .execute(&mut *conn)
    .await
    .wrap_err("Failed to update schedule")?;

    Ok(())
}

pub async fn find_schedule(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    schedule_id: Uuid,
) -> RollcallResult<Option<Schedule>> {
    tracing::debug!("Getting schedule by id: {}", schedule_id);

    let row = sqlx::query_as::<_, DbSchedule>(&format!(
        "SELECT {} FROM schedules WHERE tenant_id = $1 AND id = $2",
        SCHEDULE_COLUMNS
    ))
    .bind(tenant_id)
    .bind(schedule_id)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("Failed to load schedule")?;

    row.map(Schedule::try_from).transpose()
}

pub async fn find_schedule_by_token(
    conn: &mut PgConnection,
    token: &str,
) -> RollcallResult<Option<Schedule>> {
    let row = sqlx::query_as::<_, DbSchedule>(&format!(
        "SELECT {} FROM schedules WHERE public_token = $1",
        SCHEDULE_COLUMNS
    ))
    .bind(token)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("Failed to load schedule by token")?;

    row.map(Schedule::try_from).transpose()
}

pub async fn list_schedules(conn: &mut PgConnection, tenant_id: Uuid) -> RollcallResult<Vec<Schedule>> {
    let rows = sqlx::query_as::<_, DbSchedule>(&format!(
        "SELECT {} FROM schedules WHERE tenant_id = $1 AND status <> 'deleted' ORDER BY created_at DESC",
        SCHEDULE_COLUMNS
    ))
    .bind(tenant_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("Failed to list schedules")?;

    rows.into_iter().map(Schedule::try_from).collect()
}

pub async fn list_candidates(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    schedule_id: Uuid,
) -> RollcallResult<Vec<CandidateDate>> {
    let rows = sqlx::query_as::<_, DbCandidateDate>(
        r#"
        SELECT id, schedule_id, date, start_time, end_time, display_order, created_at
        FROM candidate_dates
        WHERE tenant_id = $1 AND schedule_id = $2
        ORDER BY display_order ASC
        "#,
    )
    .bind(tenant_id)
    .bind(schedule_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("Failed to list candidate dates")?;

    Ok(rows.into_iter().map(CandidateDate::from).collect())
}

/// Deletes `removed` (and their responses) and upserts `candidates`.
/// Surviving candidates only ever change position.
pub async fn save_candidates(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    schedule_id: Uuid,
    candidates: &[CandidateDate],
    removed: &[Uuid],
) -> RollcallResult<()> {
    if !removed.is_empty() {
        tracing::debug!(
            "Removing {} candidate(s) from schedule {}",
            removed.len(),
            schedule_id
        );

        sqlx::query("DELETE FROM schedule_responses WHERE tenant_id = $1 AND candidate_id = ANY($2)")
            .bind(tenant_id)
            .bind(removed)
            .execute(&mut *conn)
            .await
            .wrap_err("Failed to delete responses of removed candidates")?;

        sqlx::query(
            "DELETE FROM candidate_dates WHERE tenant_id = $1 AND schedule_id = $2 AND id = ANY($3)",
        )
        .bind(tenant_id)
        .bind(schedule_id)
        .bind(removed)
        .execute(&mut *conn)
        .await
        .wrap_err("Failed to delete removed candidates")?;
    }

    for candidate in candidates {
        sqlx::query(
            r#"
            INSERT INTO candidate_dates (id, tenant_id, schedule_id, date, start_time, end_time,
                                         display_order, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id)
            DO UPDATE SET display_order = EXCLUDED.display_order
            "#,
        )
        .bind(candidate.id)
        .bind(tenant_id)
        .bind(schedule_id)
        .bind(candidate.date)
        .bind(candidate.start_time)
        .bind(candidate.end_time)
        .bind(candidate.display_order)
        .bind(candidate.created_at)
        .execute(&mut *conn)
        .await
        .wrap_err("Failed to save candidate date")?;
    }

    Ok(())
}

pub async fn list_group_assignments(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    schedule_id: Uuid,
) -> RollcallResult<Vec<ScheduleGroupAssignment>> {
    let rows = sqlx::query_as::<_, DbScheduleGroupAssignment>(
        r#"
        SELECT schedule_id, group_id, created_at
        FROM schedule_group_assignments
        WHERE tenant_id = $1 AND schedule_id = $2
        ORDER BY created_at ASC, group_id ASC
        "#,
    )
    .bind(tenant_id)
    .bind(schedule_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("Failed to list schedule group assignments")?;

    Ok(rows.into_iter().map(ScheduleGroupAssignment::from).collect())
}

pub async fn replace_group_assignments(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    schedule_id: Uuid,
    assignments: &[ScheduleGroupAssignment],
) -> RollcallResult<()> {
    sqlx::query("DELETE FROM schedule_group_assignments WHERE tenant_id = $1 AND schedule_id = $2")
        .bind(tenant_id)
        .bind(schedule_id)
        .execute(&mut *conn)
        .await
        .wrap_err("Failed to clear schedule group assignments")?;

    for assignment in assignments {
        sqlx::query(
            r#"
            INSERT INTO schedule_group_assignments (tenant_id, schedule_id, group_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(tenant_id)
        .bind(assignment.schedule_id)
        .bind(assignment.group_id)
        .bind(assignment.created_at)
        .execute(&mut *conn)
        .await
        .wrap_err("Failed to insert schedule group assignment")?;
    }

    Ok(())
}

pub async fn find_responded_candidate(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    candidate_ids: &[Uuid],
) -> RollcallResult<Option<Uuid>> {
    let candidate = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT candidate_id
        FROM schedule_responses
        WHERE tenant_id = $1 AND candidate_id = ANY($2)
        LIMIT 1
        "#,
    )
    .bind(tenant_id)
    .bind(candidate_ids)
    .fetch_optional(&mut *conn)
    .await
    .wrap_err("Failed to look up responses of candidates")?;

    Ok(candidate)
}

pub async fn upsert_response(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    response: &ScheduleResponse,
) -> RollcallResult<()> {
    sqlx::query(
        r#"
        INSERT INTO schedule_responses (id, tenant_id, schedule_id, member_id, candidate_id,
                                        availability, note, responded_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (schedule_id, member_id, candidate_id)
        DO UPDATE SET availability = EXCLUDED.availability,
                      note = EXCLUDED.note,
                      responded_at = EXCLUDED.responded_at
        "#,
    )
    .bind(response.id)
    .bind(tenant_id)
    .bind(response.schedule_id)
    .bind(response.member_id)
    .bind(response.candidate_id)
    .bind(response.availability.as_str())
    .bind(&response.note)
    .bind(response.responded_at)
    .execute(&mut *conn)
    .await
    .wrap_err("Failed to upsert schedule response")?;

    Ok(())
}

pub async fn list_responses(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    schedule_id: Uuid,
) -> RollcallResult<Vec<ScheduleResponse>> {
    let rows = sqlx::query_as::<_, DbScheduleResponse>(
        r#"
        SELECT id, schedule_id, member_id, candidate_id, availability, note, responded_at
        FROM schedule_responses
        WHERE tenant_id = $1 AND schedule_id = $2
        ORDER BY responded_at ASC, member_id ASC
        "#,
    )
    .bind(tenant_id)
    .bind(schedule_id)
    .fetch_all(&mut *conn)
    .await
    .wrap_err("Failed to list schedule responses")?;

    rows.into_iter().map(ScheduleResponse::try_from).collect()
}
