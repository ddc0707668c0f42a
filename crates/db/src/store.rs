//! Postgres-backed storage.
//!
//! Every commit runs in one transaction that first locks the professional's
//! availability row, so commits for the same professional are serialized
//! while other professionals proceed in parallel. The partial unique index
//! on active booking starts backs this up.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use eyre::WrapErr;
use slotwise_core::errors::{BookingError, BookingResult, ConflictKind};
use slotwise_core::guard::{check_claim, check_movable, check_transition};
use slotwise_core::models::booking::{Booking, BookingStatus, SlotClaim, SlotTarget};
use slotwise_core::models::schedule::ProfessionalAvailability;
use slotwise_core::store::{AvailabilityStore, BookingLedger};
use sqlx::{Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::models::into_bookings;
use crate::repositories::{availability, booking};
use crate::DbPool;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn begin(&self) -> BookingResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await.wrap_err("Failed to start transaction")?)
    }

    async fn locked_availability(
        tx: &mut Transaction<'static, Postgres>,
        professional_id: Uuid,
    ) -> BookingResult<ProfessionalAvailability> {
        let row = availability::lock_availability(&mut **tx, professional_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("Professional with ID {} not found", professional_id))
            })?;
        Ok(ProfessionalAvailability::try_from(row)?)
    }

    async fn bookings_on(
        tx: &mut Transaction<'static, Postgres>,
        professional_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Vec<Booking>> {
        let rows = booking::get_active_bookings(&mut **tx, professional_id, date, date).await?;
        Ok(into_bookings(rows)?)
    }
}

/// A concurrent insert that slipped past the lock still loses on the index.
fn map_write_error(report: eyre::Report) -> BookingError {
    if let Some(sqlx::Error::Database(err)) = report.downcast_ref::<sqlx::Error>() {
        if err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return ConflictKind::SlotAlreadyTaken.into();
        }
    }
    BookingError::Database(report)
}

#[async_trait]
impl AvailabilityStore for PgStore {
    async fn get_availability(&self, professional_id: Uuid) -> eyre::Result<Option<ProfessionalAvailability>> {
        availability::get_availability(&self.pool, professional_id)
            .await?
            .map(ProfessionalAvailability::try_from)
            .transpose()
    }

    async fn put_availability(
        &self,
        availability: ProfessionalAvailability,
    ) -> eyre::Result<ProfessionalAvailability> {
        let row = availability::upsert_availability(&self.pool, &availability).await?;
        ProfessionalAvailability::try_from(row)
    }
}

#[async_trait]
impl BookingLedger for PgStore {
    async fn get_booking(&self, booking_id: Uuid) -> eyre::Result<Option<Booking>> {
        booking::get_booking_by_id(&self.pool, booking_id)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn active_bookings(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> eyre::Result<Vec<Booking>> {
        let rows = booking::get_active_bookings(&self.pool, professional_id, from, to).await?;
        into_bookings(rows)
    }

    async fn reserve(&self, claim: SlotClaim, now: NaiveDateTime) -> BookingResult<Booking> {
        let mut tx = self.begin().await?;

        let availability = Self::locked_availability(&mut tx, claim.professional_id).await?;
        let occupied = Self::bookings_on(&mut tx, claim.professional_id, claim.date).await?;
        check_claim(
            &availability,
            &occupied,
            claim.date,
            claim.start_time,
            claim.end_time,
            now,
            None,
        )?;

        let row = booking::create_booking(&mut *tx, &Booking::pending(&claim))
            .await
            .map_err(map_write_error)?;
        tx.commit().await.wrap_err("Failed to commit reservation")?;

        debug!(booking_id = %row.id, "Reservation committed");
        Ok(Booking::try_from(row)?)
    }

    async fn reschedule(&self, booking_id: Uuid, target: SlotTarget, now: NaiveDateTime) -> BookingResult<Booking> {
        let mut tx = self.begin().await?;

        let professional_id = booking::get_booking_by_id(&mut *tx, booking_id)
            .await?
            .map(|row| row.professional_id)
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;

        // Availability first, then the booking, same order as every other commit
        let availability = Self::locked_availability(&mut tx, professional_id).await?;
        let current = booking::lock_booking(&mut *tx, booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;
        check_movable(&Booking::try_from(current)?)?;

        let occupied = Self::bookings_on(&mut tx, professional_id, target.date).await?;
        check_claim(
            &availability,
            &occupied,
            target.date,
            target.start_time,
            target.end_time,
            now,
            Some(booking_id),
        )?;

        let row = booking::update_booking_slot(
            &mut *tx,
            booking_id,
            target.date,
            target.start_time,
            target.end_time,
        )
        .await
        .map_err(map_write_error)?;
        tx.commit().await.wrap_err("Failed to commit reschedule")?;

        Ok(Booking::try_from(row)?)
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        expected: Option<BookingStatus>,
    ) -> BookingResult<Booking> {
        let mut tx = self.begin().await?;

        let current = booking::lock_booking(&mut *tx, booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", booking_id)))?;
        check_transition(&Booking::try_from(current)?, status, expected)?;

        let row = booking::update_booking_status(&mut *tx, booking_id, status)
            .await
            .map_err(map_write_error)?;
        tx.commit().await.wrap_err("Failed to commit status change")?;

        Ok(Booking::try_from(row)?)
    }
}
