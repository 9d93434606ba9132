use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/schedules",
            post(handlers::schedule::create_schedule).get(handlers::schedule::list_schedules),
        )
        .route(
            "/api/schedules/:id",
            get(handlers::schedule::get_schedule)
                .put(handlers::schedule::update_schedule)
                .delete(handlers::schedule::delete_schedule),
        )
        .route(
            "/api/schedules/:id/close",
            post(handlers::schedule::close_schedule),
        )
        .route(
            "/api/schedules/:id/decide",
            post(handlers::schedule::decide_schedule),
        )
}
