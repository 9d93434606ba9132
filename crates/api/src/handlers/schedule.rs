use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rollcall_core::models::schedule::{
    CreateScheduleRequest, DecideScheduleRequest, Schedule, ScheduleDetail, UpdateScheduleRequest,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{error_handling::AppError, tenant::TenantId},
};

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleDetail>), AppError> {
    let detail = state.schedules.create_schedule(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let schedules = state.schedules.list_schedules(tenant_id).await?;
    Ok(Json(schedules))
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleDetail>, AppError> {
    let detail = state.schedules.get_schedule(tenant_id, id).await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> Result<Json<ScheduleDetail>, AppError> {
    let detail = state.schedules.update_schedule(tenant_id, id, payload).await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn close_schedule(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<Uuid>,
) -> Result<Json<Schedule>, AppError> {
    let schedule = state.schedules.close_schedule(tenant_id, id).await?;
    Ok(Json(schedule))
}

#[axum::debug_handler]
pub async fn decide_schedule(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecideScheduleRequest>,
) -> Result<Json<Schedule>, AppError> {
    let schedule = state
        .schedules
        .decide_schedule(tenant_id, id, payload.candidate_id)
        .await?;
    Ok(Json(schedule))
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.schedules.delete_schedule(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
