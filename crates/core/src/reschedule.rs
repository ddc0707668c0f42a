//! Moving an existing booking to another slot.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability::AvailabilityResolver;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::errors::{BookingError, BookingResult};
use crate::guard::{check_movable, validate_interval};
use crate::models::booking::{Booking, SlotTarget};
use crate::models::events::BookingEvent;
use crate::models::slot::Slot;
use crate::models::time;
use crate::sink::EventSink;
use crate::store::{AvailabilityStore, BookingLedger};

#[derive(Clone)]
pub struct RescheduleCoordinator {
    resolver: AvailabilityResolver,
    availability: Arc<dyn AvailabilityStore>,
    ledger: Arc<dyn BookingLedger>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl RescheduleCoordinator {
    pub fn new(
        resolver: AvailabilityResolver,
        availability: Arc<dyn AvailabilityStore>,
        ledger: Arc<dyn BookingLedger>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            resolver,
            availability,
            ledger,
            events,
            clock,
            config,
        }
    }

    /// Slots the booking could move to over the booking horizon. The
    /// booking's own slot is included while it is still in the future.
    pub async fn propose(&self, booking_id: Uuid) -> BookingResult<Vec<Slot>> {
        let booking = self.movable_booking(booking_id).await?;

        let today = self.clock.now().date();
        let until = today + Duration::days(i64::from(self.config.horizon_days.max(1)) - 1);

        self.resolver
            .list_excluding(booking.professional_id, today, until, Some(booking.id))
            .await
    }

    /// Moves the booking to `date` at `start_time`, keeping its status.
    ///
    /// The target is re-validated and written in one atomic step by the
    /// ledger, ignoring the booking's current interval.
    pub async fn confirm(
        &self,
        booking_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> BookingResult<Booking> {
        let booking = self.movable_booking(booking_id).await?;
        let previous = booking.slot();

        let availability = self
            .availability
            .get_availability(booking.professional_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!(
                    "Professional with ID {} not found",
                    booking.professional_id
                ))
            })?;

        let end_time = time::add_minutes(start_time, availability.service_duration()).ok_or_else(|| {
            BookingError::Validation("Booking would run past midnight".to_string())
        })?;
        validate_interval(start_time, end_time)?;

        let target = SlotTarget {
            date,
            start_time,
            end_time,
        };

        let moved = match self.ledger.reschedule(booking_id, target, self.clock.now()).await {
            Ok(moved) => moved,
            Err(BookingError::Conflict(kind)) => {
                warn!(%booking_id, %date, %start_time, code = kind.code(), "Reschedule rejected");
                return Err(BookingError::Conflict(kind));
            }
            Err(err) => return Err(err),
        };

        info!(
            %booking_id,
            from = %previous.starts_at(),
            to = %moved.slot().starts_at(),
            "Booking rescheduled"
        );

        self.events
            .publish(BookingEvent::BookingRescheduled {
                booking_id,
                professional_id: moved.professional_id,
                customer_id: moved.customer_id,
                previous,
                slot: moved.slot(),
                occurred_at: self.clock.timestamp(),
            })
            .await;

        Ok(moved)
    }

    async fn movable_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        let booking = self
            .ledger
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;

        check_movable(&booking)?;
        Ok(booking)
    }
}
