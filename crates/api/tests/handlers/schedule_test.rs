use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rollcall_core::models::schedule::{Schedule, ScheduleDetail, ScheduleStatus};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_create_schedule_returns_detail() {
    let ctx = TestContext::new();

    let detail = ctx.create_schedule(&["2024-06-01", "2024-06-08"]).await;

    assert_eq!(detail.schedule.title, "Club outing");
    assert_eq!(detail.schedule.status, ScheduleStatus::Open);
    assert_eq!(detail.schedule.tenant_id, ctx.tenant);
    assert_eq!(detail.schedule.public_token.len(), 32);
    assert_eq!(
        detail
            .candidates
            .iter()
            .map(|c| c.display_order)
            .collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[tokio::test]
async fn test_create_schedule_rejects_blank_title() {
    let ctx = TestContext::new();

    let response = ctx
        .admin_post(
            "/api/schedules",
            json!({ "title": "  ", "candidates": [{ "date": "2024-06-01" }] }),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().unwrap().contains("Title"));
}

#[tokio::test]
async fn test_get_and_list_schedules_are_tenant_scoped() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01"]).await;

    let response = ctx
        .admin_get(&format!("/api/schedules/{}", detail.schedule.id))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<ScheduleDetail>(), detail);

    let listed = ctx.admin_get("/api/schedules").await.json::<Vec<Schedule>>();
    assert_eq!(listed.len(), 1);

    let other_tenant = Uuid::new_v4().to_string();
    let response = ctx
        .server
        .get(&format!("/api/schedules/{}", detail.schedule.id))
        .add_header(
            axum::http::HeaderName::from_static("x-tenant-id"),
            axum::http::HeaderValue::from_str(&other_tenant).unwrap(),
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_keeps_surviving_candidate_ids() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01", "2024-06-08"]).await;
    let kept = detail.candidates[1].id;

    let response = ctx
        .admin_put(
            &format!("/api/schedules/{}", detail.schedule.id),
            json!({
                "title": "Club outing (revised)",
                "candidates": [{ "date": "2024-06-15" }, { "date": "2024-06-08" }],
            }),
        )
        .await;

    response.assert_status_ok();
    let updated = response.json::<ScheduleDetail>();
    assert_eq!(updated.schedule.title, "Club outing (revised)");
    assert_eq!(updated.candidates.len(), 2);
    assert_eq!(updated.candidates[1].id, kept);
    assert_eq!(updated.candidates[1].display_order, 1);
}

#[tokio::test]
async fn test_update_with_answered_candidate_removed_conflicts_without_force() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01", "2024-06-08"]).await;
    let removed = detail.candidates[0].id;

    ctx.server
        .post(&format!(
            "/api/public/schedules/{}/responses",
            detail.schedule.public_token
        ))
        .json(&json!({
            "member_id": Uuid::new_v4(),
            "responses": [{ "candidate_id": removed, "availability": "available" }],
        }))
        .await
        .assert_status_ok();

    let path = format!("/api/schedules/{}", detail.schedule.id);
    let body = json!({
        "title": "Club outing",
        "candidates": [{ "date": "2024-06-08" }],
    });
    ctx.admin_put(&path, body.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    let mut forced = body;
    forced["force"] = json!(true);
    let response = ctx.admin_put(&path, forced).await;
    response.assert_status_ok();
    assert_eq!(response.json::<ScheduleDetail>().candidates.len(), 1);
    assert!(ctx.store.schedule_responses().await.is_empty());
}

#[tokio::test]
async fn test_close_decide_and_delete_lifecycle() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01", "2024-06-08"]).await;
    let id = detail.schedule.id;
    let chosen = detail.candidates[1].id;

    let closed = ctx
        .admin_post(&format!("/api/schedules/{}/close", id), json!({}))
        .await;
    closed.assert_status_ok();
    assert_eq!(closed.json::<Schedule>().status, ScheduleStatus::Closed);

    let decided = ctx
        .admin_post(
            &format!("/api/schedules/{}/decide", id),
            json!({ "candidate_id": chosen }),
        )
        .await;
    decided.assert_status_ok();
    let decided = decided.json::<Schedule>();
    assert_eq!(decided.status, ScheduleStatus::Decided);
    assert_eq!(decided.decided_candidate_id, Some(chosen));

    ctx.admin_post(&format!("/api/schedules/{}/close", id), json!({}))
        .await
        .assert_status(StatusCode::CONFLICT);

    ctx.admin_delete(&format!("/api/schedules/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    ctx.admin_get(&format!("/api/schedules/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    ctx.admin_delete(&format!("/api/schedules/{}", id))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_decide_with_unknown_candidate_is_not_found() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01"]).await;

    ctx.admin_post(
        &format!("/api/schedules/{}/decide", detail.schedule.id),
        json!({ "candidate_id": Uuid::new_v4() }),
    )
    .await
    .assert_status(StatusCode::NOT_FOUND);
}
