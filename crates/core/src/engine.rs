//! # Booking Engine
//!
//! Single entry point for callers. It wires the resolver, the conflict
//! guard and the reschedule coordinator to the same stores, and adds the
//! schedule management and booking lifecycle operations around them.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::availability::AvailabilityResolver;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::errors::{BookingError, BookingResult};
use crate::guard::ConflictGuard;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::events::{BookingEvent, CancellationReason};
use crate::models::schedule::{
    ProfessionalAvailability, UpdateAvailabilityRequest, UpdateAvailabilityResponse,
};
use crate::models::slot::Slot;
use crate::models::time;
use crate::reschedule::RescheduleCoordinator;
use crate::sink::EventSink;
use crate::store::{AvailabilityStore, BookingLedger};

#[derive(Clone)]
pub struct BookingEngine {
    availability: Arc<dyn AvailabilityStore>,
    ledger: Arc<dyn BookingLedger>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    resolver: AvailabilityResolver,
    guard: ConflictGuard,
    reschedule: RescheduleCoordinator,
    config: EngineConfig,
}

impl BookingEngine {
    pub fn new(
        availability: Arc<dyn AvailabilityStore>,
        ledger: Arc<dyn BookingLedger>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let resolver = AvailabilityResolver::new(
            availability.clone(),
            ledger.clone(),
            clock.clone(),
            config,
        );
        let guard = ConflictGuard::new(ledger.clone(), events.clone(), clock.clone());
        let reschedule = RescheduleCoordinator::new(
            resolver.clone(),
            availability.clone(),
            ledger.clone(),
            events.clone(),
            clock.clone(),
            config,
        );

        Self {
            availability,
            ledger,
            events,
            clock,
            resolver,
            guard,
            reschedule,
            config,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Wall-clock time in the canonical zone, as seen by every check.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub async fn list_available_slots(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BookingResult<Vec<Slot>> {
        self.resolver.list_available_slots(professional_id, from, to).await
    }

    /// Reserves the slot starting at `start_time`. The end time follows
    /// from the professional's service duration.
    pub async fn reserve_slot(
        &self,
        professional_id: Uuid,
        customer_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> BookingResult<Booking> {
        let availability = self.require_availability(professional_id).await?;
        let end_time = time::add_minutes(start_time, availability.service_duration()).ok_or_else(|| {
            BookingError::Validation("Booking would run past midnight".to_string())
        })?;

        self.guard
            .reserve(professional_id, customer_id, date, start_time, end_time)
            .await
    }

    pub async fn propose_reschedule(&self, booking_id: Uuid) -> BookingResult<Vec<Slot>> {
        self.reschedule.propose(booking_id).await
    }

    pub async fn confirm_reschedule(
        &self,
        booking_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> BookingResult<Booking> {
        self.reschedule.confirm(booking_id, date, start_time).await
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.ledger
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))
    }

    pub async fn confirm_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.transition(booking_id, BookingStatus::Confirmed).await
    }

    pub async fn complete_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.transition(booking_id, BookingStatus::Completed).await
    }

    pub async fn cancel_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        let booking = self.transition(booking_id, BookingStatus::Cancelled).await?;
        self.announce_cancellation(&booking, CancellationReason::Requested).await;
        Ok(booking)
    }

    pub async fn get_availability(&self, professional_id: Uuid) -> BookingResult<ProfessionalAvailability> {
        self.require_availability(professional_id).await
    }

    /// Overwrites the professional's availability record.
    ///
    /// With auto-decline on, pending bookings that no longer fit the new
    /// schedule are cancelled. Confirmed bookings are left alone.
    pub async fn update_availability(
        &self,
        professional_id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> BookingResult<UpdateAvailabilityResponse> {
        let availability = request.into_availability(professional_id);
        availability.validate()?;

        let availability = self.availability.put_availability(availability).await?;
        info!(%professional_id, auto_decline = availability.auto_decline, "Availability updated");

        let auto_declined = if availability.auto_decline {
            self.decline_unavailable(&availability).await?
        } else {
            Vec::new()
        };

        Ok(UpdateAvailabilityResponse {
            availability,
            auto_declined,
        })
    }

    async fn decline_unavailable(&self, availability: &ProfessionalAvailability) -> BookingResult<Vec<Uuid>> {
        let today = self.clock.now().date();
        let upcoming = self
            .ledger
            .active_bookings(availability.professional_id, today, NaiveDate::MAX)
            .await?;

        let mut declined = Vec::new();
        for booking in upcoming {
            if booking.status != BookingStatus::Pending
                || availability.covers(booking.date, booking.start_time, booking.end_time)
            {
                continue;
            }

            match self
                .ledger
                .update_status(booking.id, BookingStatus::Cancelled, Some(BookingStatus::Pending))
                .await
            {
                Ok(cancelled) => {
                    self.announce_cancellation(&cancelled, CancellationReason::AutoDeclined)
                        .await;
                    declined.push(cancelled.id);
                }
                Err(BookingError::InvalidState(reason)) => {
                    debug!(booking_id = %booking.id, %reason, "Skipping auto-decline");
                }
                Err(err) => return Err(err),
            }
        }

        if !declined.is_empty() {
            warn!(
                professional_id = %availability.professional_id,
                count = declined.len(),
                "Auto-declined pending bookings"
            );
        }

        Ok(declined)
    }

    async fn transition(&self, booking_id: Uuid, status: BookingStatus) -> BookingResult<Booking> {
        let booking = self.ledger.update_status(booking_id, status, None).await?;
        info!(%booking_id, %status, "Booking status changed");
        Ok(booking)
    }

    async fn announce_cancellation(&self, booking: &Booking, reason: CancellationReason) {
        self.events
            .publish(BookingEvent::BookingCancelled {
                booking_id: booking.id,
                professional_id: booking.professional_id,
                customer_id: booking.customer_id,
                slot: booking.slot(),
                reason,
                occurred_at: self.clock.timestamp(),
            })
            .await;
    }

    async fn require_availability(&self, professional_id: Uuid) -> BookingResult<ProfessionalAvailability> {
        self.availability
            .get_availability(professional_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("Professional with ID {} not found", professional_id))
            })
    }
}
