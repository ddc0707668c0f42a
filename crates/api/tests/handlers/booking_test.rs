use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use slotwise_core::models::booking::{Booking, BookingStatus};
use slotwise_core::models::events::BookingEvent;
use slotwise_core::models::slot::SlotListResponse;
use uuid::Uuid;

use crate::test_utils::{TestContext, MONDAY, TUESDAY};

#[test_log::test(tokio::test)]
async fn test_reserve_returns_pending_booking() {
    let mut ctx = TestContext::new();
    let id = ctx.professional().await;

    let booking = ctx.reserve(id, MONDAY, "10:00").await;

    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["start_time"], "10:00");
    assert_eq!(booking["end_time"], "10:30");
    assert_eq!(ctx.store.booking_count().await, 1);
    assert!(matches!(
        ctx.events.try_recv(),
        Ok(BookingEvent::BookingReserved { .. })
    ));
}

#[test_log::test(tokio::test)]
async fn test_second_reservation_conflicts() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;
    ctx.reserve(id, MONDAY, "10:00").await;

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&json!({
            "professional_id": id,
            "customer_id": Uuid::new_v4(),
            "date": MONDAY,
            "start_time": "10:00",
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "SLOT_ALREADY_TAKEN");
}

#[test_log::test(tokio::test)]
async fn test_stale_slot_is_no_longer_available() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&json!({
            "professional_id": id,
            "customer_id": Uuid::new_v4(),
            "date": "2026-10-15",
            "start_time": "09:00",
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "SLOT_NO_LONGER_AVAILABLE");
}

#[test_log::test(tokio::test)]
async fn test_malformed_reservation_is_400() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;

    for start_time in ["25:00", "10:00:30", "ten"] {
        let response = ctx
            .server
            .post("/api/bookings")
            .json(&json!({
                "professional_id": id,
                "customer_id": Uuid::new_v4(),
                "date": MONDAY,
                "start_time": start_time,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    // Sunday is not in the weekly template
    let response = ctx
        .server
        .post("/api/bookings")
        .json(&json!({
            "professional_id": id,
            "customer_id": Uuid::new_v4(),
            "date": "2026-10-18",
            "start_time": "10:00",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_reschedule_flow() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;
    let booking: Booking = serde_json::from_value(ctx.reserve(id, MONDAY, "10:00").await).unwrap();

    let proposals: SlotListResponse = ctx
        .server
        .get(&format!("/api/bookings/{}/reschedule", booking.id))
        .await
        .json();
    assert!(proposals.slots.contains(&booking.slot()));

    let response = ctx
        .server
        .post(&format!("/api/bookings/{}/reschedule", booking.id))
        .json(&json!({ "date": TUESDAY, "start_time": "11:00" }))
        .await;
    response.assert_status_ok();

    let moved: Booking = response.json();
    assert_eq!(moved.id, booking.id);
    assert_eq!(moved.date.to_string(), TUESDAY);
    assert_eq!(moved.status, BookingStatus::Pending);

    let monday: SlotListResponse = ctx
        .server
        .get(&format!("/api/professionals/{}/slots?from={}&to={}", id, MONDAY, MONDAY))
        .await
        .json();
    assert_eq!(monday.slots.len(), 16);
}

#[test_log::test(tokio::test)]
async fn test_lifecycle_transitions() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;
    let booking = ctx.reserve(id, MONDAY, "10:00").await;
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let response = ctx
        .server
        .post(&format!("/api/bookings/{}/complete", booking_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let confirmed: Value = ctx
        .server
        .post(&format!("/api/bookings/{}/confirm", booking_id))
        .await
        .json();
    assert_eq!(confirmed["status"], "confirmed");

    let completed: Value = ctx
        .server
        .post(&format!("/api/bookings/{}/complete", booking_id))
        .await
        .json();
    assert_eq!(completed["status"], "completed");

    let response = ctx
        .server
        .post(&format!("/api/bookings/{}/cancel", booking_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let response = ctx
        .server
        .get(&format!("/api/bookings/{}/reschedule", booking_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn test_cancel_frees_slot() {
    let ctx = TestContext::new();
    let id = ctx.professional().await;
    let booking = ctx.reserve(id, MONDAY, "10:00").await;

    ctx.server
        .post(&format!("/api/bookings/{}/cancel", booking["id"].as_str().unwrap()))
        .await
        .assert_status_ok();

    ctx.reserve(id, MONDAY, "10:00").await;
}

#[test_log::test(tokio::test)]
async fn test_unknown_booking_is_404() {
    let ctx = TestContext::new();

    ctx.server
        .get(&format!("/api/bookings/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    ctx.server
        .post(&format!("/api/bookings/{}/cancel", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_health() {
    let ctx = TestContext::new();

    let body: Value = ctx.server.get("/health").await.json();
    assert_eq!(
        body,
        json!({
            "status": "ok",
            "now": "2026-10-15T12:00:00",
            "booking_horizon_days": 30,
        })
    );
}
