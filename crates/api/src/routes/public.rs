use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/public/schedules/:token",
            get(handlers::public::get_public_schedule),
        )
        .route(
            "/api/public/schedules/:token/responses",
            get(handlers::public::list_responses).post(handlers::public::submit_responses),
        )
}
