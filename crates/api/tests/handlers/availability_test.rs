use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use slotwise_core::models::schedule::ProfessionalAvailability;
use slotwise_core::models::slot::SlotListResponse;
use uuid::Uuid;

use crate::test_utils::{weekdays, TestContext, MONDAY, TUESDAY};

#[test_log::test(tokio::test)]
async fn test_availability_round_trip() {
    let ctx = TestContext::new();
    let mut availability = weekdays();
    availability["buffer_minutes"] = json!(15);
    availability["vacation"] = json!({"start_date": "2026-12-24", "end_date": "2027-01-02"});
    let id = ctx.professional_with(availability).await;

    let response = ctx
        .server
        .get(&format!("/api/professionals/{}/availability", id))
        .await;
    response.assert_status_ok();

    let stored: ProfessionalAvailability = response.json();
    assert_eq!(stored.professional_id, id);
    assert_eq!(stored.buffer_minutes, 15);
    assert_eq!(stored.slot_interval_minutes, 30);
    assert_eq!(stored.weekly_schedule.days().len(), 5);
    assert!(stored.vacation.is_some());
}

#[test_log::test(tokio::test)]
async fn test_unknown_professional_is_404() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/professionals/{}/availability", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx
        .server
        .get(&format!(
            "/api/professionals/{}/slots?from={}&to={}",
            Uuid::new_v4(),
            MONDAY,
            MONDAY
        ))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_invalid_schedule_is_400() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .put(&format!("/api/professionals/{}/availability", Uuid::new_v4()))
        .json(&json!({
            "weekly_schedule": [
                {"weekday": "Mon", "enabled": true, "start_time": "17:00", "end_time": "09:00"}
            ]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = ctx
        .server
        .put(&format!("/api/professionals/{}/availability", Uuid::new_v4()))
        .json(&json!({
            "weekly_schedule": [
                {"weekday": "Mon", "enabled": true, "start_time": "9am", "end_time": "17:00"}
            ]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_list_slots_for_a_day() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;

    let response = ctx
        .server
        .get(&format!("/api/professionals/{}/slots?from={}&to={}", id, MONDAY, MONDAY))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(
        slots[0],
        json!({"date": MONDAY, "start_time": "09:00", "end_time": "09:30"})
    );
}

#[test_log::test(tokio::test)]
async fn test_list_slots_skips_blocked_and_closed_days() {
    let ctx = TestContext::new();
    let mut availability = weekdays();
    availability["blocked_dates"] = json!([TUESDAY]);
    let id = ctx.professional_with(availability).await;

    // Saturday through Tuesday
    let response = ctx
        .server
        .get(&format!("/api/professionals/{}/slots?from=2026-10-17&to={}", id, TUESDAY))
        .await;
    response.assert_status_ok();

    let body: SlotListResponse = response.json();
    assert_eq!(body.slots.len(), 16);
    assert!(body.slots.iter().all(|slot| slot.date.to_string() == MONDAY));
}

#[test_log::test(tokio::test)]
async fn test_list_slots_today_hides_started_slots() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;

    let response = ctx
        .server
        .get(&format!("/api/professionals/{}/slots?from=2026-10-15&to=2026-10-15", id))
        .await;
    let body: SlotListResponse = response.json();

    // 12:30 through 16:30
    assert_eq!(body.slots.len(), 9);
    assert_eq!(body.slots[0].start_time.to_string(), "12:30:00");
}

#[test_log::test(tokio::test)]
async fn test_list_slots_rejects_bad_ranges() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;

    for query in [
        format!("from={}&to={}", TUESDAY, MONDAY),
        "from=2026-10-19&to=2027-10-19".to_string(),
        "from=monday&to=tuesday".to_string(),
        format!("from={}", MONDAY),
    ] {
        let response = ctx
            .server
            .get(&format!("/api/professionals/{}/slots?{}", id, query))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[test_log::test(tokio::test)]
async fn test_update_with_auto_decline_reports_cancellations() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;
    let booking = ctx.reserve(id, MONDAY, "10:00").await;

    let mut availability = weekdays();
    availability["blocked_dates"] = json!([MONDAY]);
    availability["auto_decline"] = json!(true);
    let response = ctx
        .server
        .put(&format!("/api/professionals/{}/availability", id))
        .json(&availability)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["auto_declined"], json!([booking["id"].clone()]));

    let cancelled: Value = ctx
        .server
        .get(&format!("/api/bookings/{}", booking["id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(cancelled["status"], "cancelled");
}
