use std::sync::Arc;

use axum_test::TestServer;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};
use slotwise_api::{build_router, ApiState};
use slotwise_core::clock::FixedClock;
use slotwise_core::config::EngineConfig;
use slotwise_core::models::events::BookingEvent;
use slotwise_core::sink::BroadcastEventSink;
use slotwise_core::BookingEngine;
use slotwise_db::InMemoryStore;
use tokio::sync::broadcast::Receiver;
use uuid::Uuid;

pub const MONDAY: &str = "2026-10-19";
pub const TUESDAY: &str = "2026-10-20";

/// Thursday noon, the frozen "now" of every API test.
pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 15)
        .unwrap()
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
}

pub struct TestContext {
    pub server: TestServer,
    pub store: InMemoryStore,
    pub events: Receiver<BookingEvent>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let sink = BroadcastEventSink::default();
        let events = sink.subscribe();
        let engine = BookingEngine::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(sink),
            Arc::new(FixedClock(now())),
            EngineConfig::default(),
        );

        let server = TestServer::new(build_router(ApiState::new(engine)))
            .expect("Failed to start test server");

        Self {
            server,
            store,
            events,
        }
    }

    /// Registers a professional working 09:00-17:00 on weekdays.
    pub async fn professional(&self) -> Uuid {
        self.professional_with(weekdays()).await
    }

    pub async fn professional_with(&self, availability: Value) -> Uuid {
        let id = Uuid::new_v4();
        self.server
            .put(&format!("/api/professionals/{}/availability", id))
            .json(&availability)
            .await
            .assert_status_ok();
        id
    }

    pub async fn reserve(&self, professional_id: Uuid, date: &str, start: &str) -> Value {
        let response = self
            .server
            .post("/api/bookings")
            .json(&json!({
                "professional_id": professional_id,
                "customer_id": Uuid::new_v4(),
                "date": date,
                "start_time": start,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}

pub fn weekdays() -> Value {
    let days: Vec<Value> = ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|weekday| {
            json!({
                "weekday": weekday,
                "enabled": true,
                "start_time": "09:00",
                "end_time": "17:00",
            })
        })
        .collect();

    json!({ "weekly_schedule": days })
}
