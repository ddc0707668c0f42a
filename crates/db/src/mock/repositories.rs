use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;
use slotwise_core::errors::BookingResult;
use slotwise_core::models::booking::{Booking, BookingStatus, SlotClaim, SlotTarget};
use slotwise_core::models::schedule::ProfessionalAvailability;
use slotwise_core::store::{AvailabilityStore, BookingLedger};
use uuid::Uuid;

// Stands in for both storage ports at once
mock! {
    pub Store {}

    #[async_trait]
    impl AvailabilityStore for Store {
        async fn get_availability(
            &self,
            professional_id: Uuid,
        ) -> eyre::Result<Option<ProfessionalAvailability>>;

        async fn put_availability(
            &self,
            availability: ProfessionalAvailability,
        ) -> eyre::Result<ProfessionalAvailability>;
    }

    #[async_trait]
    impl BookingLedger for Store {
        async fn get_booking(&self, booking_id: Uuid) -> eyre::Result<Option<Booking>>;

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

        async fn update_status(
            &self,
            booking_id: Uuid,
            status: BookingStatus,
            expected: Option<BookingStatus>,
        ) -> BookingResult<Booking>;
    }
}
