use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schedules/:id/convert",
            post(handlers::attendance::convert_schedule),
        )
        .route(
            "/api/collections/:id",
            get(handlers::attendance::get_collection),
        )
}
