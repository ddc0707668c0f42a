//! Publishing of booking domain events.
//!
//! Delivery is someone else's job: sinks hand events over and return.
//! Publishing never fails a booking operation.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::models::events::BookingEvent;

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: BookingEvent);
}

/// Writes every event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: BookingEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_default();
        info!(event = event.name(), booking_id = %event.booking_id(), %payload, "booking event");
    }
}

/// Fans events out to in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<BookingEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, event: BookingEvent) {
        if self.sender.send(event).is_err() {
            debug!("No subscribers for booking event");
        }
    }
}
