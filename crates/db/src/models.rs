use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use slotwise_core::models::booking::Booking;
use slotwise_core::models::schedule::{ProfessionalAvailability, VacationPeriod, WeeklySchedule};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAvailability {
    pub professional_id: Uuid,
    pub weekly_schedule: Json<WeeklySchedule>,
    pub vacation_start: Option<NaiveDate>,
    pub vacation_end: Option<NaiveDate>,
    pub blocked_dates: Vec<NaiveDate>,
    pub buffer_minutes: i32,
    pub slot_interval_minutes: i32,
    pub service_duration_minutes: Option<i32>,
    pub auto_decline: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub customer_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn minutes(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| eyre!("Negative {} in stored availability", column))
}

impl TryFrom<DbAvailability> for ProfessionalAvailability {
    type Error = eyre::Report;

    fn try_from(row: DbAvailability) -> Result<Self> {
        let vacation = match (row.vacation_start, row.vacation_end) {
            (Some(start_date), Some(end_date)) => Some(VacationPeriod {
                start_date,
                end_date,
            }),
            (None, None) => None,
            _ => return Err(eyre!("Half-open vacation for professional {}", row.professional_id)),
        };

        Ok(ProfessionalAvailability {
            professional_id: row.professional_id,
            weekly_schedule: row.weekly_schedule.0,
            vacation,
            blocked_dates: row.blocked_dates.into_iter().collect(),
            buffer_minutes: minutes(row.buffer_minutes, "buffer_minutes")?,
            slot_interval_minutes: minutes(row.slot_interval_minutes, "slot_interval_minutes")?,
            service_duration_minutes: row
                .service_duration_minutes
                .map(|value| minutes(value, "service_duration_minutes"))
                .transpose()?,
            auto_decline: row.auto_decline,
        })
    }
}

impl TryFrom<DbBooking> for Booking {
    type Error = eyre::Report;

    fn try_from(row: DbBooking) -> Result<Self> {
        let status = row
            .status
            .parse()
            .wrap_err_with(|| format!("Booking {} has an unreadable status", row.id))?;

        Ok(Booking {
            id: row.id,
            professional_id: row.professional_id,
            customer_id: row.customer_id,
            date: row.booking_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Converts fetched booking rows, failing on the first unreadable one.
pub fn into_bookings(rows: Vec<DbBooking>) -> Result<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use slotwise_core::models::booking::BookingStatus;
    use slotwise_core::models::schedule::DaySchedule;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn availability_row() -> DbAvailability {
        DbAvailability {
            professional_id: Uuid::new_v4(),
            weekly_schedule: Json(WeeklySchedule::new(vec![DaySchedule::open(
                Weekday::Mon,
                t(9, 0),
                t(17, 0),
            )])),
            vacation_start: None,
            vacation_end: None,
            blocked_dates: vec![NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()],
            buffer_minutes: 15,
            slot_interval_minutes: 30,
            service_duration_minutes: Some(45),
            auto_decline: true,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_availability_row_converts() {
        let row = availability_row();
        let availability = ProfessionalAvailability::try_from(row.clone()).unwrap();

        assert_eq!(availability.professional_id, row.professional_id);
        assert_eq!(availability.buffer_minutes, 15);
        assert_eq!(availability.service_duration(), 45);
        assert!(availability.auto_decline);
        assert_eq!(availability.blocked_dates.len(), 1);
        assert!(availability.vacation.is_none());
    }

    #[test]
    fn test_half_open_vacation_is_rejected() {
        let mut row = availability_row();
        row.vacation_start = NaiveDate::from_ymd_opt(2026, 12, 24);
        assert!(ProfessionalAvailability::try_from(row).is_err());
    }

    #[rstest]
    #[case::buffer(|row: &mut DbAvailability| row.buffer_minutes = -5)]
    #[case::interval(|row: &mut DbAvailability| row.slot_interval_minutes = -30)]
    #[case::duration(|row: &mut DbAvailability| row.service_duration_minutes = Some(-1))]
    fn test_negative_minutes_are_rejected(#[case] corrupt: fn(&mut DbAvailability)) {
        let mut row = availability_row();
        corrupt(&mut row);
        assert!(ProfessionalAvailability::try_from(row).is_err());
    }

    #[rstest]
    #[case("pending", BookingStatus::Pending)]
    #[case("confirmed", BookingStatus::Confirmed)]
    #[case("cancelled", BookingStatus::Cancelled)]
    #[case("completed", BookingStatus::Completed)]
    fn test_booking_status_column_parses(#[case] column: &str, #[case] expected: BookingStatus) {
        let now = Utc::now();
        let row = DbBooking {
            id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            booking_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            start_time: t(10, 0),
            end_time: t(10, 30),
            status: column.to_string(),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(Booking::try_from(row).unwrap().status, expected);
    }

    #[test]
    fn test_booking_row_converts() {
        let now = Utc::now();
        let row = DbBooking {
            id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            booking_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            start_time: t(10, 0),
            end_time: t(10, 30),
            status: "confirmed".to_string(),
            created_at: now,
            updated_at: now,
        };

        let booking = Booking::try_from(row.clone()).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.date, row.booking_date);

        let broken = DbBooking {
            status: "archived".to_string(),
            ..row
        };
        assert!(Booking::try_from(broken).is_err());
    }
}
