use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::slot::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    Requested,
    /// The professional made the date unavailable with auto-decline enabled.
    AutoDeclined,
}

/// Domain events published for notification and analytics consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    BookingReserved {
        booking_id: Uuid,
        professional_id: Uuid,
        customer_id: Uuid,
        slot: Slot,
        occurred_at: DateTime<Utc>,
    },
    BookingRescheduled {
        booking_id: Uuid,
        professional_id: Uuid,
        customer_id: Uuid,
        previous: Slot,
        slot: Slot,
        occurred_at: DateTime<Utc>,
    },
    BookingCancelled {
        booking_id: Uuid,
        professional_id: Uuid,
        customer_id: Uuid,
        slot: Slot,
        reason: CancellationReason,
        occurred_at: DateTime<Utc>,
    },
}

impl BookingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BookingEvent::BookingReserved { .. } => "booking_reserved",
            BookingEvent::BookingRescheduled { .. } => "booking_rescheduled",
            BookingEvent::BookingCancelled { .. } => "booking_cancelled",
        }
    }

    pub fn booking_id(&self) -> Uuid {
        match self {
            BookingEvent::BookingReserved { booking_id, .. }
            | BookingEvent::BookingRescheduled { booking_id, .. }
            | BookingEvent::BookingCancelled { booking_id, .. } => *booking_id,
        }
    }
}
