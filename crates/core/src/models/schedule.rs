use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::time::{self, hh_mm};

pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 30;

/// Opening hours for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub weekday: Weekday,
    pub enabled: bool,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
}

impl DaySchedule {
    pub fn open(weekday: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            weekday,
            enabled: true,
            start_time,
            end_time,
        }
    }

    /// Whether `[start, end)` lies inside this day's window.
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.enabled && self.start_time <= start && end <= self.end_time && start < end
    }
}

/// Recurring per-weekday template. A weekday missing from the list is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: Vec<DaySchedule>,
}

impl WeeklySchedule {
    pub fn new(days: Vec<DaySchedule>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[DaySchedule] {
        &self.days
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.days.iter().find(|day| day.weekday == weekday)
    }

    /// The enabled window for `weekday`, if any.
    pub fn open_window(&self, weekday: Weekday) -> Option<&DaySchedule> {
        self.day(weekday).filter(|day| day.enabled)
    }

    pub fn validate(&self) -> BookingResult<()> {
        let mut seen = HashSet::new();
        for day in &self.days {
            if !seen.insert(day.weekday) {
                return Err(BookingError::Validation(format!(
                    "{} appears more than once in the weekly schedule",
                    day.weekday
                )));
            }
            if !time::is_minute_resolution(day.start_time) || !time::is_minute_resolution(day.end_time) {
                return Err(BookingError::Validation(format!(
                    "{} hours must be whole minutes",
                    day.weekday
                )));
            }
            if day.enabled && day.start_time >= day.end_time {
                return Err(BookingError::Validation(format!(
                    "{} start time must be before end time",
                    day.weekday
                )));
            }
        }
        Ok(())
    }
}

/// Inclusive date range during which the professional takes no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl VacationPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// How the schedule treats a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Vacation,
    Blocked,
    /// The weekday is disabled or missing from the template.
    Closed,
    Open(DaySchedule),
}

/// Everything the professional controls about when they can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalAvailability {
    pub professional_id: Uuid,
    #[serde(default)]
    pub weekly_schedule: WeeklySchedule,
    #[serde(default)]
    pub vacation: Option<VacationPeriod>,
    #[serde(default)]
    pub blocked_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub buffer_minutes: u32,
    #[serde(default = "default_interval")]
    pub slot_interval_minutes: u32,
    /// Defaults to the slot interval when absent.
    #[serde(default)]
    pub service_duration_minutes: Option<u32>,
    #[serde(default)]
    pub auto_decline: bool,
}

fn default_interval() -> u32 {
    DEFAULT_SLOT_INTERVAL_MINUTES
}

impl ProfessionalAvailability {
    pub fn new(professional_id: Uuid, weekly_schedule: WeeklySchedule) -> Self {
        Self {
            professional_id,
            weekly_schedule,
            vacation: None,
            blocked_dates: BTreeSet::new(),
            buffer_minutes: 0,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            service_duration_minutes: None,
            auto_decline: false,
        }
    }

    pub fn service_duration(&self) -> u32 {
        self.service_duration_minutes
            .unwrap_or(self.slot_interval_minutes)
    }

    /// Vacation wins over blocked dates, which win over the weekly template.
    pub fn day_status(&self, date: NaiveDate) -> DayStatus {
        if self.vacation.is_some_and(|vacation| vacation.contains(date)) {
            return DayStatus::Vacation;
        }
        if self.blocked_dates.contains(&date) {
            return DayStatus::Blocked;
        }
        match self.weekly_schedule.open_window(date.weekday()) {
            Some(day) => DayStatus::Open(*day),
            None => DayStatus::Closed,
        }
    }

    /// Whether `[start, end)` on `date` still falls inside working hours.
    pub fn covers(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        match self.day_status(date) {
            DayStatus::Open(day) => day.contains(start, end),
            _ => false,
        }
    }

    pub fn validate(&self) -> BookingResult<()> {
        self.weekly_schedule.validate()?;

        if let Some(vacation) = &self.vacation {
            if vacation.start_date > vacation.end_date {
                return Err(BookingError::Validation(
                    "Vacation start date must not be after its end date".to_string(),
                ));
            }
        }
        if self.slot_interval_minutes == 0 {
            return Err(BookingError::Validation(
                "Slot interval must be at least one minute".to_string(),
            ));
        }
        if self.service_duration() == 0 {
            return Err(BookingError::Validation(
                "Service duration must be at least one minute".to_string(),
            ));
        }
        if self.service_duration() as i64 >= time::MINUTES_PER_DAY
            || self.buffer_minutes as i64 >= time::MINUTES_PER_DAY
        {
            return Err(BookingError::Validation(
                "Service duration and buffer must be shorter than a day".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full overwrite of a professional's availability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    #[serde(default)]
    pub weekly_schedule: WeeklySchedule,
    #[serde(default)]
    pub vacation: Option<VacationPeriod>,
    #[serde(default)]
    pub blocked_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub buffer_minutes: u32,
    #[serde(default = "default_interval")]
    pub slot_interval_minutes: u32,
    #[serde(default)]
    pub service_duration_minutes: Option<u32>,
    #[serde(default)]
    pub auto_decline: bool,
}

impl UpdateAvailabilityRequest {
    pub fn into_availability(self, professional_id: Uuid) -> ProfessionalAvailability {
        ProfessionalAvailability {
            professional_id,
            weekly_schedule: self.weekly_schedule,
            vacation: self.vacation,
            blocked_dates: self.blocked_dates,
            buffer_minutes: self.buffer_minutes,
            slot_interval_minutes: self.slot_interval_minutes,
            service_duration_minutes: self.service_duration_minutes,
            auto_decline: self.auto_decline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityResponse {
    pub availability: ProfessionalAvailability,
    /// Pending bookings cancelled because their date became unavailable.
    pub auto_declined: Vec<Uuid>,
}
