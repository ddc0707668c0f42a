use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use slotwise_core::errors::{BookingError, BookingResult};
use slotwise_core::guard::{check_claim, check_movable, check_transition};
use slotwise_core::models::booking::{Booking, BookingStatus, SlotClaim, SlotTarget};
use slotwise_core::models::schedule::ProfessionalAvailability;
use slotwise_core::store::{AvailabilityStore, BookingLedger};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    availability: HashMap<Uuid, ProfessionalAvailability>,
    bookings: HashMap<Uuid, Booking>,
}

impl State {
    fn availability(&self, professional_id: Uuid) -> BookingResult<&ProfessionalAvailability> {
        self.availability.get(&professional_id).ok_or_else(|| {
            BookingError::NotFound(format!("Professional with ID {} not found", professional_id))
        })
    }

    fn active_on(&self, professional_id: Uuid, date: NaiveDate) -> Vec<Booking> {
        self.bookings
            .values()
            .filter(|booking| {
                booking.professional_id == professional_id
                    && booking.date == date
                    && booking.status.is_active()
            })
            .cloned()
            .collect()
    }

    fn booking_mut(&mut self, booking_id: Uuid) -> BookingResult<&mut Booking> {
        self.bookings
            .get_mut(&booking_id)
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))
    }
}

/// Process-local store. Each commit holds the write lock for its whole
/// check-and-write, which makes it atomic against every other commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bookings in any status.
    pub async fn booking_count(&self) -> usize {
        self.state.read().await.bookings.len()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryStore {
    async fn get_availability(&self, professional_id: Uuid) -> eyre::Result<Option<ProfessionalAvailability>> {
        Ok(self.state.read().await.availability.get(&professional_id).cloned())
    }

    async fn put_availability(
        &self,
        availability: ProfessionalAvailability,
    ) -> eyre::Result<ProfessionalAvailability> {
        let mut state = self.state.write().await;
        state
            .availability
            .insert(availability.professional_id, availability.clone());
        Ok(availability)
    }
}

#[async_trait]
impl BookingLedger for InMemoryStore {
    async fn get_booking(&self, booking_id: Uuid) -> eyre::Result<Option<Booking>> {
        Ok(self.state.read().await.bookings.get(&booking_id).cloned())
    }

    async fn active_bookings(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> eyre::Result<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| {
                booking.professional_id == professional_id
                    && booking.status.is_active()
                    && from <= booking.date
                    && booking.date <= to
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| (booking.date, booking.start_time));
        Ok(bookings)
    }

    async fn reserve(&self, claim: SlotClaim, now: NaiveDateTime) -> BookingResult<Booking> {
        let mut state = self.state.write().await;

        let availability = state.availability(claim.professional_id)?;
        let occupied = state.active_on(claim.professional_id, claim.date);
        check_claim(
            availability,
            &occupied,
            claim.date,
            claim.start_time,
            claim.end_time,
            now,
            None,
        )?;

        let booking = Booking::pending(&claim);
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn reschedule(&self, booking_id: Uuid, target: SlotTarget, now: NaiveDateTime) -> BookingResult<Booking> {
        let mut state = self.state.write().await;

        let current = state.booking_mut(booking_id)?.clone();
        check_movable(&current)?;

        let availability = state.availability(current.professional_id)?;
        let occupied = state.active_on(current.professional_id, target.date);
        check_claim(
            availability,
            &occupied,
            target.date,
            target.start_time,
            target.end_time,
            now,
            Some(booking_id),
        )?;

        let booking = state.booking_mut(booking_id)?;
        booking.date = target.date;
        booking.start_time = target.start_time;
        booking.end_time = target.end_time;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        expected: Option<BookingStatus>,
    ) -> BookingResult<Booking> {
        let mut state = self.state.write().await;

        let booking = state.booking_mut(booking_id)?;
        check_transition(booking, status, expected)?;
        booking.status = status;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }
}
