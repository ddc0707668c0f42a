//! # Conflict Guard
//!
//! The commit path that turns a chosen slot into a booking.
//!
//! A slot list shown to a customer can be stale by the time they pick from
//! it, so nothing here trusts a previous query. [`check_claim`] re-runs the
//! resolution rules against the schedule and occupied intervals as they are
//! at commit time, including the buffer around existing bookings. Ledger
//! implementations call it from inside their atomic section so that, for a
//! given professional, at most one of several racing claims can succeed.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability::day_generator;
use crate::clock::Clock;
use crate::errors::{BookingError, BookingResult, ConflictKind};
use crate::models::booking::{Booking, BookingStatus, SlotClaim};
use crate::models::events::BookingEvent;
use crate::models::schedule::{DayStatus, ProfessionalAvailability};
use crate::models::time;
use crate::sink::EventSink;
use crate::store::BookingLedger;

/// Checks that `[start, end)` on `date` can be committed.
///
/// * weekday disabled or missing → `Validation`
/// * vacation, blocked date, off-grid start, wrong length, or already
///   started → `Conflict(SlotNoLongerAvailable)`
/// * overlaps a buffer-widened active booking → `Conflict(SlotAlreadyTaken)`
///
/// `ignore` skips one booking, used when moving that booking.
pub fn check_claim(
    availability: &ProfessionalAvailability,
    occupied: &[Booking],
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    now: NaiveDateTime,
    ignore: Option<Uuid>,
) -> BookingResult<()> {
    validate_interval(start, end)?;

    let day = match availability.day_status(date) {
        DayStatus::Open(day) => day,
        DayStatus::Vacation | DayStatus::Blocked => {
            return Err(ConflictKind::SlotNoLongerAvailable.into());
        }
        DayStatus::Closed => {
            return Err(BookingError::Validation(format!(
                "Professional does not work on {}",
                date.format("%A")
            )));
        }
    };

    let generator = day_generator(availability, &day);
    let expected_end = time::add_minutes(start, availability.service_duration());
    if !generator.offers(start) || expected_end != Some(end) {
        return Err(ConflictKind::SlotNoLongerAvailable.into());
    }

    if date.and_time(start) <= now {
        return Err(ConflictKind::SlotNoLongerAvailable.into());
    }

    let taken = occupied
        .iter()
        .filter(|booking| Some(booking.id) != ignore)
        .filter(|booking| booking.professional_id == availability.professional_id)
        .any(|booking| booking.blocks(date, start, end, availability.buffer_minutes));
    if taken {
        return Err(ConflictKind::SlotAlreadyTaken.into());
    }

    Ok(())
}

/// Rejects intervals that are empty or not on whole minutes.
pub fn validate_interval(start: NaiveTime, end: NaiveTime) -> BookingResult<()> {
    if !time::is_minute_resolution(start) || !time::is_minute_resolution(end) {
        return Err(BookingError::Validation(
            "Booking times must be whole minutes".to_string(),
        ));
    }
    if start >= end {
        return Err(BookingError::Validation(
            "Booking start time must be before its end time".to_string(),
        ));
    }
    Ok(())
}

/// Checks a status change against the lifecycle table.
pub fn check_transition(
    booking: &Booking,
    next: BookingStatus,
    expected: Option<BookingStatus>,
) -> BookingResult<()> {
    if let Some(expected) = expected {
        if booking.status != expected {
            return Err(BookingError::InvalidState(format!(
                "Booking {} is {}, expected {}",
                booking.id, booking.status, expected
            )));
        }
    }
    if !booking.status.can_transition_to(next) {
        return Err(BookingError::InvalidState(format!(
            "Booking {} cannot move from {} to {}",
            booking.id, booking.status, next
        )));
    }
    Ok(())
}

/// Rejects moves of bookings that no longer hold a slot.
pub fn check_movable(booking: &Booking) -> BookingResult<()> {
    if booking.status.is_terminal() {
        return Err(BookingError::InvalidState(format!(
            "Booking {} is {} and cannot be rescheduled",
            booking.id, booking.status
        )));
    }
    Ok(())
}

/// Commits reservations through the ledger and announces them.
#[derive(Clone)]
pub struct ConflictGuard {
    ledger: Arc<dyn BookingLedger>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl ConflictGuard {
    pub fn new(ledger: Arc<dyn BookingLedger>, events: Arc<dyn EventSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            events,
            clock,
        }
    }

    /// Reserves `[start_time, end_time)` on `date` for the customer.
    ///
    /// The ledger performs the check and the insert atomically. On success
    /// the booking is pending and a `BookingReserved` event is published.
    /// Conflicts are returned to the caller untouched; nothing is retried.
    pub async fn reserve(
        &self,
        professional_id: Uuid,
        customer_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> BookingResult<Booking> {
        validate_interval(start_time, end_time)?;

        let claim = SlotClaim {
            professional_id,
            customer_id,
            date,
            start_time,
            end_time,
        };

        let booking = match self.ledger.reserve(claim, self.clock.now()).await {
            Ok(booking) => booking,
            Err(BookingError::Conflict(kind)) => {
                warn!(%professional_id, %date, %start_time, code = kind.code(), "Reservation rejected");
                return Err(BookingError::Conflict(kind));
            }
            Err(err) => return Err(err),
        };

        info!(
            booking_id = %booking.id,
            %professional_id,
            %customer_id,
            %date,
            %start_time,
            "Slot reserved"
        );

        self.events
            .publish(BookingEvent::BookingReserved {
                booking_id: booking.id,
                professional_id,
                customer_id,
                slot: booking.slot(),
                occurred_at: self.clock.timestamp(),
            })
            .await;

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::{DaySchedule, VacationPeriod, WeeklySchedule};
    use chrono::Weekday;
    use rstest::rstest;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_time(t(12, 0))
    }

    fn availability() -> ProfessionalAvailability {
        let mut availability = ProfessionalAvailability::new(
            Uuid::new_v4(),
            WeeklySchedule::new(vec![DaySchedule::open(Weekday::Mon, t(9, 0), t(17, 0))]),
        );
        availability.buffer_minutes = 15;
        availability
    }

    fn existing(availability: &ProfessionalAvailability) -> Booking {
        let claim = SlotClaim {
            professional_id: availability.professional_id,
            customer_id: Uuid::new_v4(),
            date: monday(),
            start_time: t(10, 0),
            end_time: t(10, 30),
        };
        Booking {
            status: BookingStatus::Confirmed,
            ..Booking::pending(&claim)
        }
    }

    fn code(result: BookingResult<()>) -> Option<ConflictKind> {
        result.err().and_then(|err| err.conflict_kind())
    }

    #[test]
    fn test_free_slot_passes() {
        let availability = availability();
        let occupied = vec![existing(&availability)];
        assert!(check_claim(&availability, &occupied, monday(), t(9, 0), t(9, 30), now(), None).is_ok());
        assert!(check_claim(&availability, &occupied, monday(), t(11, 0), t(11, 30), now(), None).is_ok());
    }

    #[rstest]
    #[case(t(9, 30), t(10, 0))]
    #[case(t(10, 0), t(10, 30))]
    #[case(t(10, 30), t(11, 0))]
    fn test_buffer_is_enforced_at_commit(#[case] start: NaiveTime, #[case] end: NaiveTime) {
        let availability = availability();
        let occupied = vec![existing(&availability)];
        assert_eq!(
            code(check_claim(&availability, &occupied, monday(), start, end, now(), None)),
            Some(ConflictKind::SlotAlreadyTaken)
        );
    }

    #[test]
    fn test_ignored_booking_does_not_conflict() {
        let availability = availability();
        let booking = existing(&availability);
        let occupied = vec![booking.clone()];
        assert!(check_claim(&availability, &occupied, monday(), t(10, 0), t(10, 30), now(), Some(booking.id)).is_ok());
    }

    #[test]
    fn test_vacation_is_no_longer_available() {
        let mut availability = availability();
        availability.vacation = Some(VacationPeriod {
            start_date: monday(),
            end_date: monday(),
        });
        assert_eq!(
            code(check_claim(&availability, &[], monday(), t(9, 0), t(9, 30), now(), None)),
            Some(ConflictKind::SlotNoLongerAvailable)
        );
    }

    #[test]
    fn test_blocked_date_is_no_longer_available() {
        let mut availability = availability();
        availability.blocked_dates.insert(monday());
        assert_eq!(
            code(check_claim(&availability, &[], monday(), t(9, 0), t(9, 30), now(), None)),
            Some(ConflictKind::SlotNoLongerAvailable)
        );
    }

    #[rstest]
    #[case(t(9, 15), t(9, 45))]
    #[case(t(9, 0), t(10, 0))]
    #[case(t(16, 45), t(17, 15))]
    #[case(t(8, 30), t(9, 0))]
    fn test_off_grid_is_no_longer_available(#[case] start: NaiveTime, #[case] end: NaiveTime) {
        assert_eq!(
            code(check_claim(&availability(), &[], monday(), start, end, now(), None)),
            Some(ConflictKind::SlotNoLongerAvailable)
        );
    }

    #[test]
    fn test_started_slot_is_no_longer_available() {
        let later = monday().and_time(t(9, 10));
        assert_eq!(
            code(check_claim(&availability(), &[], monday(), t(9, 0), t(9, 30), later, None)),
            Some(ConflictKind::SlotNoLongerAvailable)
        );
    }

    #[test]
    fn test_unscheduled_day_is_validation_error() {
        let tuesday = monday().succ_opt().unwrap();
        let result = check_claim(&availability(), &[], tuesday, t(9, 0), t(9, 30), now(), None);
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[test]
    fn test_day_switched_off_is_validation_error() {
        let mut availability = availability();
        let mut day = availability.weekly_schedule.days()[0];
        day.enabled = false;
        availability.weekly_schedule = WeeklySchedule::new(vec![day]);

        let result = check_claim(&availability, &[], monday(), t(9, 0), t(9, 30), now(), None);
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[test]
    fn test_transition_respects_expected_status() {
        let booking = existing(&availability());

        assert!(check_transition(&booking, BookingStatus::Completed, None).is_ok());
        assert!(matches!(
            check_transition(&booking, BookingStatus::Cancelled, Some(BookingStatus::Pending)),
            Err(BookingError::InvalidState(_))
        ));
        assert!(matches!(
            check_transition(&booking, BookingStatus::Pending, None),
            Err(BookingError::InvalidState(_))
        ));
    }

    #[test]
    fn test_terminal_booking_is_not_movable() {
        let mut booking = existing(&availability());
        assert!(check_movable(&booking).is_ok());

        booking.status = BookingStatus::Completed;
        assert!(matches!(check_movable(&booking), Err(BookingError::InvalidState(_))));
    }

    #[test]
    fn test_inverted_interval_is_validation_error() {
        let result = check_claim(&availability(), &[], monday(), t(10, 0), t(9, 30), now(), None);
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }
}
