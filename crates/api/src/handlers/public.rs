//! Routes reached with a schedule's public token instead of tenant identity.

use axum::{
    Json,
    extract::{Path, State},
};
use rollcall_core::models::{
    response::{ResponseListing, SubmitResponsesRequest, SubmitResponsesResponse},
    schedule::PublicScheduleView,
};
use std::sync::Arc;

use crate::{ApiState, middleware::error_handling::AppError};

#[axum::debug_handler]
pub async fn get_public_schedule(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
) -> Result<Json<PublicScheduleView>, AppError> {
    let view = state.schedules.get_public_schedule(&token).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn submit_responses(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
    Json(payload): Json<SubmitResponsesRequest>,
) -> Result<Json<SubmitResponsesResponse>, AppError> {
    let receipt = state.responses.submit(&token, payload).await?;
    Ok(Json(receipt))
}

#[axum::debug_handler]
pub async fn list_responses(
    State(state): State<Arc<ApiState>>,
    Path(token): Path<String>,
) -> Result<Json<ResponseListing>, AppError> {
    let listing = state.responses.list_responses(&token).await?;
    Ok(Json(listing))
}
