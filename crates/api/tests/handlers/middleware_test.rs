use axum::http::{HeaderName, HeaderValue, StatusCode};
use rollcall_api::middleware::error_handling::map_error;
use rollcall_core::errors::RollcallError;
use rstest::rstest;
use serde_json::Value;

use crate::test_utils::TestContext;

#[rstest]
#[case(RollcallError::NotFound("Resource not found".to_string()), StatusCode::NOT_FOUND)]
#[case(RollcallError::Validation("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(RollcallError::Conflict("Already decided".to_string()), StatusCode::CONFLICT)]
#[case(RollcallError::Authentication("Missing tenant".to_string()), StatusCode::UNAUTHORIZED)]
#[case(RollcallError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    RollcallError::Internal(Box::new(std::io::Error::new(std::io::ErrorKind::Other, "Internal error"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: RollcallError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_admin_routes_require_tenant_header() {
    let ctx = TestContext::new();

    ctx.server
        .get("/api/schedules")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = ctx
        .server
        .get("/api/schedules")
        .add_header(
            HeaderName::from_static("x-tenant-id"),
            HeaderValue::from_static("not-a-uuid"),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Authentication error: Invalid tenant header"
    );
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "ok");

    let version = ctx.server.get("/version").await;
    assert_eq!(
        version.json::<Value>()["version"],
        env!("CARGO_PKG_VERSION")
    );
}
