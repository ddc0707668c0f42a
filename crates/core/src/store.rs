//! Ports for the storage collaborators the engine relies on.
//!
//! Plain reads and writes report failures as `eyre` reports, the same way
//! the repository functions do. The commit paths return [`BookingError`]
//! because they must distinguish conflicts from storage failures.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::booking::{Booking, BookingStatus, SlotClaim, SlotTarget};
use crate::models::schedule::ProfessionalAvailability;

/// Per-professional schedule rules, keyed by professional id.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn get_availability(
        &self,
        professional_id: Uuid,
    ) -> eyre::Result<Option<ProfessionalAvailability>>;

    /// Overwrites every field of the record.
    async fn put_availability(
        &self,
        availability: ProfessionalAvailability,
    ) -> eyre::Result<ProfessionalAvailability>;
}

/// The booking ledger.
///
/// `reserve`, `reschedule` and `update_status` must each run as one atomic
/// unit: the schedule and the occupied intervals are re-read and checked
/// with [`crate::guard::check_claim`] while writes for the same
/// professional are excluded.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn get_booking(&self, booking_id: Uuid) -> eyre::Result<Option<Booking>>;

    /// Pending and confirmed bookings of a professional dated within `[from, to]`.
    async fn active_bookings(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> eyre::Result<Vec<Booking>>;

    async fn reserve(&self, claim: SlotClaim, now: NaiveDateTime) -> BookingResult<Booking>;

    async fn reschedule(
        &self,
        booking_id: Uuid,
        target: SlotTarget,
        now: NaiveDateTime,
    ) -> BookingResult<Booking>;

    /// Moves a booking to `status`. With `expected` set, the booking must
    /// currently be in that state.
    async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        expected: Option<BookingStatus>,
    ) -> BookingResult<Booking>;
}
