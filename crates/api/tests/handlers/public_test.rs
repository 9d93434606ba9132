use axum::http::StatusCode;
use chrono::Duration;
use pretty_assertions::assert_eq;
use rollcall_core::models::{
    response::{Availability, ResponseListing, SubmitResponsesResponse},
    schedule::PublicScheduleView,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, start};

fn responses_path(token: &str) -> String {
    format!("/api/public/schedules/{}/responses", token)
}

#[tokio::test]
async fn test_public_view_needs_no_tenant() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01", "2024-06-08"]).await;

    let response = ctx
        .server
        .get(&format!("/api/public/schedules/{}", detail.schedule.public_token))
        .await;

    response.assert_status_ok();
    let view = response.json::<PublicScheduleView>();
    assert_eq!(view.id, detail.schedule.id);
    assert!(view.accepting_responses);
    assert_eq!(view.candidates, detail.candidates);
}

#[tokio::test]
async fn test_unknown_and_malformed_tokens_look_the_same() {
    let ctx = TestContext::new();

    let unknown = ctx
        .server
        .get(&format!("/api/public/schedules/{}", "a".repeat(32)))
        .await;
    let malformed = ctx.server.get("/api/public/schedules/not-a-token").await;

    unknown.assert_status(StatusCode::NOT_FOUND);
    malformed.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(unknown.json::<Value>(), malformed.json::<Value>());
}

#[tokio::test]
async fn test_submit_skips_unknown_candidates_and_tallies() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01", "2024-06-08"]).await;
    let token = &detail.schedule.public_token;
    let member = Uuid::new_v4();

    let response = ctx
        .server
        .post(&responses_path(token))
        .json(&json!({
            "member_id": member,
            "responses": [
                { "candidate_id": detail.candidates[0].id, "availability": "available", "note": "after 6" },
                { "candidate_id": Uuid::new_v4(), "availability": "maybe" },
                { "candidate_id": detail.candidates[1].id, "availability": "unavailable" },
            ],
        }))
        .await;

    response.assert_status_ok();
    let receipt = response.json::<SubmitResponsesResponse>();
    assert_eq!(receipt.member_id, member);
    assert_eq!(receipt.responded_at, start());

    let listing = ctx
        .server
        .get(&responses_path(token))
        .await
        .json::<ResponseListing>();
    assert_eq!(listing.responses.len(), 2);
    assert_eq!(listing.tallies.len(), 2);
    assert_eq!(listing.tallies[0].candidate_id, detail.candidates[0].id);
    assert_eq!(listing.tallies[0].available, 1);
    assert_eq!(listing.tallies[1].unavailable, 1);
    assert!(
        listing
            .responses
            .iter()
            .any(|r| r.availability == Availability::Available && r.note == "after 6")
    );
}

#[tokio::test]
async fn test_invalid_availability_rejects_whole_batch() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01", "2024-06-08"]).await;

    let response = ctx
        .server
        .post(&responses_path(&detail.schedule.public_token))
        .json(&json!({
            "member_id": Uuid::new_v4(),
            "responses": [
                { "candidate_id": detail.candidates[0].id, "availability": "available" },
                { "candidate_id": detail.candidates[1].id, "availability": "perhaps" },
            ],
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.store.schedule_responses().await.is_empty());
}

#[tokio::test]
async fn test_submit_after_deadline_conflicts() {
    let ctx = TestContext::new();
    let deadline = start() + Duration::days(1);
    let created = ctx
        .admin_post(
            "/api/schedules",
            json!({
                "title": "Deadline outing",
                "deadline": deadline,
                "candidates": [{ "date": "2024-06-01" }],
            }),
        )
        .await;
    created.assert_status(StatusCode::CREATED);
    let detail = created.json::<rollcall_core::models::schedule::ScheduleDetail>();

    ctx.clock.set(deadline + Duration::seconds(1));

    ctx.server
        .post(&responses_path(&detail.schedule.public_token))
        .json(&json!({
            "member_id": Uuid::new_v4(),
            "responses": [{ "candidate_id": detail.candidates[0].id, "availability": "available" }],
        }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let view = ctx
        .server
        .get(&format!("/api/public/schedules/{}", detail.schedule.public_token))
        .await
        .json::<PublicScheduleView>();
    assert!(!view.accepting_responses);
}
