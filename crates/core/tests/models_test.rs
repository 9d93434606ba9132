use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rollcall_core::models::{
    attendance::{ConvertToAttendanceRequest, ResponseType, TargetType},
    candidate::CandidateInput,
    response::{Availability, SubmitResponsesRequest},
    schedule::{CreateScheduleRequest, ScheduleStatus, UpdateScheduleRequest},
};
use rstest::rstest;
use serde_json::{from_value, json, to_value};
use uuid::Uuid;

#[test]
fn test_create_schedule_request_defaults() {
    let request: CreateScheduleRequest = from_value(json!({
        "title": "Autumn training camp",
        "candidates": [
            { "date": "2024-06-01" },
            { "date": "2024-06-02", "start_time": "18:00:00", "end_time": "20:00:00" }
        ]
    }))
    .expect("Failed to deserialize create schedule request");

    assert_eq!(request.description, "");
    assert_eq!(request.event_id, None);
    assert_eq!(request.deadline, None);
    assert!(request.group_ids.is_empty());
    assert_eq!(
        request.candidates,
        vec![
            CandidateInput {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                start_time: None,
                end_time: None,
            },
            CandidateInput {
                date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                start_time: NaiveTime::from_hms_opt(18, 0, 0),
                end_time: NaiveTime::from_hms_opt(20, 0, 0),
            },
        ]
    );
}

#[test]
fn test_update_schedule_request_force_defaults_to_false() {
    let request: UpdateScheduleRequest = from_value(json!({
        "title": "Renamed",
        "deadline": "2024-05-31T23:59:00Z",
        "candidates": [{ "date": "2024-06-01" }]
    }))
    .expect("Failed to deserialize update schedule request");

    assert!(!request.force);
    assert_eq!(request.group_ids, None);
    assert_eq!(
        request.deadline,
        Some(Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap())
    );
}

#[test]
fn test_submit_request_keeps_raw_availability() {
    let candidate_id = Uuid::new_v4();
    let request: SubmitResponsesRequest = from_value(json!({
        "member_id": Uuid::new_v4(),
        "responses": [{ "candidate_id": candidate_id, "availability": "sometimes" }]
    }))
    .expect("Failed to deserialize submit request");

    assert_eq!(request.responses[0].availability, "sometimes");
    assert_eq!(request.responses[0].note, "");
    assert!("sometimes".parse::<Availability>().is_err());
}

#[test]
fn test_convert_request_title_is_optional() {
    let request: ConvertToAttendanceRequest = from_value(json!({
        "candidate_ids": [Uuid::new_v4()]
    }))
    .expect("Failed to deserialize convert request");

    assert_eq!(request.title, None);
    assert_eq!(request.candidate_ids.len(), 1);
}

#[rstest]
#[case(to_value(ScheduleStatus::Decided).unwrap(), "decided")]
#[case(to_value(Availability::Unavailable).unwrap(), "unavailable")]
#[case(to_value(ResponseType::Attending).unwrap(), "attending")]
#[case(to_value(TargetType::Standalone).unwrap(), "standalone")]
fn test_enums_serialize_lowercase(#[case] value: serde_json::Value, #[case] expected: &str) {
    assert_eq!(value, json!(expected));
}

#[rstest]
#[case("available", Availability::Available)]
#[case("unavailable", Availability::Unavailable)]
#[case("maybe", Availability::Maybe)]
fn test_availability_parses(#[case] raw: &str, #[case] expected: Availability) {
    assert_eq!(raw.parse::<Availability>().unwrap(), expected);
    assert_eq!(expected.to_string(), raw);
}
