use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rollcall_core::{
    errors::RollcallError,
    mock::MockMemberGroupRepository,
    models::{
        attendance::{CollectionDetail, ConvertToAttendanceResponse, ResponseType, TargetType},
        schedule::ScheduleDetail,
    },
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_convert_creates_collection_with_mapped_responses() {
    let ctx = TestContext::new();
    let group = Uuid::new_v4();
    let silent_member = Uuid::new_v4();
    ctx.store
        .set_group_members(ctx.tenant, group, vec![silent_member])
        .await;

    let created = ctx
        .admin_post(
            "/api/schedules",
            json!({
                "title": "Practice",
                "candidates": [{ "date": "2024-06-01" }, { "date": "2024-06-08" }],
                "group_ids": [group],
            }),
        )
        .await;
    created.assert_status(StatusCode::CREATED);
    let detail = created.json::<ScheduleDetail>();

    let responder = Uuid::new_v4();
    ctx.server
        .post(&format!(
            "/api/public/schedules/{}/responses",
            detail.schedule.public_token
        ))
        .json(&json!({
            "member_id": responder,
            "responses": [{ "candidate_id": detail.candidates[0].id, "availability": "available" }],
        }))
        .await
        .assert_status_ok();

    let converted = ctx
        .admin_post(
            &format!("/api/schedules/{}/convert", detail.schedule.id),
            json!({ "candidate_ids": [detail.candidates[0].id], "title": null }),
        )
        .await;
    converted.assert_status(StatusCode::CREATED);
    let converted = converted.json::<ConvertToAttendanceResponse>();
    assert_eq!(converted.title, "Practice");

    let collection = ctx
        .admin_get(&format!("/api/collections/{}", converted.collection_id))
        .await;
    collection.assert_status_ok();
    let collection = collection.json::<CollectionDetail>();

    assert_eq!(collection.collection.target_type, TargetType::Standalone);
    assert_eq!(collection.group_ids, vec![group]);
    assert_eq!(collection.target_dates.len(), 1);
    assert_eq!(collection.responses.len(), 2);

    let response_of = |member: Uuid| {
        collection
            .responses
            .iter()
            .find(|r| r.member_id == member)
            .map(|r| r.response)
    };
    assert_eq!(response_of(responder), Some(ResponseType::Attending));
    assert_eq!(response_of(silent_member), Some(ResponseType::Undecided));
}

#[tokio::test]
async fn test_convert_rejects_foreign_candidates() {
    let ctx = TestContext::new();
    let detail = ctx.create_schedule(&["2024-06-01"]).await;

    ctx.admin_post(
        &format!("/api/schedules/{}/convert", detail.schedule.id),
        json!({ "candidate_ids": [Uuid::new_v4()] }),
    )
    .await
    .assert_status(StatusCode::BAD_REQUEST);

    assert!(ctx.store.collections().await.is_empty());
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let ctx = TestContext::new();

    ctx.admin_get(&format!("/api/collections/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_group_lookup_failure_is_internal_error() {
    let mut groups = MockMemberGroupRepository::new();
    groups
        .expect_member_ids()
        .returning(|_, _| Err(RollcallError::Database(eyre::eyre!("directory offline"))));
    let ctx = TestContext::with_groups(Arc::new(groups));

    let created = ctx
        .admin_post(
            "/api/schedules",
            json!({
                "title": "Practice",
                "candidates": [{ "date": "2024-06-01" }],
                "group_ids": [Uuid::new_v4()],
            }),
        )
        .await;
    created.assert_status(StatusCode::CREATED);
    let detail = created.json::<ScheduleDetail>();

    let response = ctx
        .admin_post(
            &format!("/api/schedules/{}/convert", detail.schedule.id),
            json!({ "candidate_ids": [detail.candidates[0].id] }),
        )
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "Internal server error");
    assert!(ctx.store.collections().await.is_empty());
}
