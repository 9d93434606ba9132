use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rollcall_core::models::attendance::{
    CollectionDetail, ConvertToAttendanceRequest, ConvertToAttendanceResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{error_handling::AppError, tenant::TenantId},
};

#[axum::debug_handler]
pub async fn convert_schedule(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConvertToAttendanceRequest>,
) -> Result<(StatusCode, Json<ConvertToAttendanceResponse>), AppError> {
    let converted = state.converter.convert(tenant_id, id, payload).await?;
    Ok((StatusCode::CREATED, Json(converted)))
}

#[axum::debug_handler]
pub async fn get_collection(
    State(state): State<Arc<ApiState>>,
    TenantId(tenant_id): TenantId,
    Path(id): Path<Uuid>,
) -> Result<Json<CollectionDetail>, AppError> {
    let detail = state.converter.get_collection(tenant_id, id).await?;
    Ok(Json(detail))
}
