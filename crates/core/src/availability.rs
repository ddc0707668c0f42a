//! # Availability Resolution
//!
//! Turns a professional's schedule rules and current reservations into the
//! list of slots a customer may pick from.
//!
//! For every date in the requested range:
//!
//! 1. A date inside the vacation period has no slots
//! 2. A blocked date has no slots
//! 3. A weekday that is disabled or missing from the template has no slots
//! 4. Candidates come from [`SlotGenerator`] over that weekday's window
//! 5. Each pending or confirmed booking is widened by the buffer on both sides
//! 6. Candidates overlapping a widened booking are dropped
//! 7. On today's date, candidates that already started are dropped
//!
//! The per-day work is a pure function of its inputs; the resolver only
//! fetches those inputs fresh from the stores on every call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::errors::{BookingError, BookingResult};
use crate::models::booking::Booking;
use crate::models::schedule::{DaySchedule, DayStatus, ProfessionalAvailability};
use crate::models::slot::Slot;
use crate::models::time;
use crate::slots::SlotGenerator;
use crate::store::{AvailabilityStore, BookingLedger};

/// Slot generator for one open day of `availability`.
pub fn day_generator(availability: &ProfessionalAvailability, day: &DaySchedule) -> SlotGenerator {
    SlotGenerator::new(day.start_time, day.end_time)
        .interval(availability.slot_interval_minutes)
        .duration(availability.service_duration())
}

/// Bookable slots on a single date. `occupied` may contain bookings from
/// other dates or in terminal states; those are ignored.
pub fn slots_for_date(
    availability: &ProfessionalAvailability,
    date: NaiveDate,
    occupied: &[&Booking],
    now: NaiveDateTime,
) -> Vec<Slot> {
    if date < now.date() {
        return Vec::new();
    }

    let day = match availability.day_status(date) {
        DayStatus::Open(day) => day,
        DayStatus::Vacation | DayStatus::Blocked | DayStatus::Closed => return Vec::new(),
    };

    let duration = availability.service_duration();
    day_generator(availability, &day)
        .starts()
        .filter_map(|start| time::add_minutes(start, duration).map(|end| Slot::new(date, start, end)))
        .filter(|slot| {
            !occupied.iter().any(|booking| {
                booking.blocks(date, slot.start_time, slot.end_time, availability.buffer_minutes)
            })
        })
        .filter(|slot| slot.starts_at() > now)
        .collect()
}

/// Bookable slots over `[from, to]`, ordered by date then start time.
///
/// `exclude` removes one booking from the occupied set, which lets a
/// booking being moved see its own slot again.
pub fn resolve_slots(
    availability: &ProfessionalAvailability,
    bookings: &[Booking],
    from: NaiveDate,
    to: NaiveDate,
    now: NaiveDateTime,
    exclude: Option<Uuid>,
) -> Vec<Slot> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Booking>> = BTreeMap::new();
    for booking in bookings {
        if booking.status.is_active()
            && booking.professional_id == availability.professional_id
            && Some(booking.id) != exclude
        {
            by_date.entry(booking.date).or_default().push(booking);
        }
    }

    from.iter_days()
        .take_while(|date| *date <= to)
        .flat_map(|date| {
            let occupied = by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            slots_for_date(availability, date, occupied, now)
        })
        .collect()
}

/// Reads schedule and ledger and resolves bookable slots.
#[derive(Clone)]
pub struct AvailabilityResolver {
    availability: Arc<dyn AvailabilityStore>,
    ledger: Arc<dyn BookingLedger>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl AvailabilityResolver {
    pub fn new(
        availability: Arc<dyn AvailabilityStore>,
        ledger: Arc<dyn BookingLedger>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            availability,
            ledger,
            clock,
            config,
        }
    }

    pub async fn list_available_slots(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BookingResult<Vec<Slot>> {
        self.list_excluding(professional_id, from, to, None).await
    }

    /// Like [`Self::list_available_slots`] but treats `exclude` as if it
    /// did not exist.
    pub async fn list_excluding(
        &self,
        professional_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        exclude: Option<Uuid>,
    ) -> BookingResult<Vec<Slot>> {
        self.validate_range(from, to)?;

        let availability = self
            .availability
            .get_availability(professional_id)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("Professional with ID {} not found", professional_id))
            })?;

        let bookings = self.ledger.active_bookings(professional_id, from, to).await?;
        let slots = resolve_slots(&availability, &bookings, from, to, self.clock.now(), exclude);

        debug!(
            %professional_id, %from, %to,
            bookings = bookings.len(),
            slots = slots.len(),
            "Resolved available slots"
        );

        Ok(slots)
    }

    fn validate_range(&self, from: NaiveDate, to: NaiveDate) -> BookingResult<()> {
        if from > to {
            return Err(BookingError::Validation(format!(
                "Range start {} is after range end {}",
                from, to
            )));
        }
        let days = (to - from).num_days() + 1;
        if days > i64::from(self.config.max_range_days) {
            return Err(BookingError::Validation(format!(
                "Range covers {} days, at most {} are allowed",
                days, self.config.max_range_days
            )));
        }
        Ok(())
    }
}
