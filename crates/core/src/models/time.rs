//! Minute-resolution time-of-day helpers.
//!
//! The engine works on local wall-clock times with minute resolution. Times
//! are exchanged as `"HH:MM"` strings; `"HH:MM:SS"` is accepted on input as
//! long as the seconds are zero.

use chrono::{NaiveTime, Timelike};

use crate::errors::{BookingError, BookingResult};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Minutes elapsed since midnight.
pub fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight() / 60)
}

/// The time at `minute` past midnight, or `None` outside `0..1440`.
pub fn time_at_minute(minute: i64) -> Option<NaiveTime> {
    if !(0..MINUTES_PER_DAY).contains(&minute) {
        return None;
    }
    NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
}

/// Adds `minutes` without wrapping past midnight.
pub fn add_minutes(time: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    time_at_minute(minute_of_day(time) + i64::from(minutes))
}

pub fn is_minute_resolution(time: NaiveTime) -> bool {
    time.second() == 0 && time.nanosecond() == 0
}

pub fn parse_time(value: &str) -> BookingResult<NaiveTime> {
    let value = value.trim();
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| BookingError::Validation(format!("Invalid time '{}', expected HH:MM", value)))?;

    if !is_minute_resolution(time) {
        return Err(BookingError::Validation(format!(
            "Time '{}' must be on a whole minute",
            value
        )));
    }

    Ok(time)
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Serde adapter for `"HH:MM"` times.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_time(&value).map_err(de::Error::custom)
    }
}
