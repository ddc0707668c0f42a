//! Candidate start times for a single open window.

use chrono::NaiveTime;

use crate::models::schedule::DEFAULT_SLOT_INTERVAL_MINUTES;
use crate::models::time;

/// Steps through a day's window in fixed increments.
///
/// The generator is a plain value: every call to [`SlotGenerator::starts`]
/// begins again from the window start, so callers can iterate as often as
/// they like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGenerator {
    start_time: NaiveTime,
    end_time: NaiveTime,
    interval_minutes: u32,
    duration_minutes: Option<u32>,
}

impl SlotGenerator {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
            interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            duration_minutes: None,
        }
    }

    pub fn interval(mut self, minutes: u32) -> Self {
        self.interval_minutes = minutes;
        self
    }

    /// Length of the service. Falls back to the interval when never set.
    pub fn duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes.unwrap_or(self.interval_minutes)
    }

    pub fn starts(&self) -> SlotStarts {
        let duration = i64::from(self.duration_minutes());
        let step = i64::from(self.interval_minutes);
        let first = time::minute_of_day(self.start_time);
        let last = time::minute_of_day(self.end_time) - duration;

        if step == 0 || duration == 0 {
            return SlotStarts::empty();
        }

        SlotStarts {
            next: first,
            last,
            step,
        }
    }

    /// Whether `start` is one of the generated candidates.
    pub fn offers(&self, start: NaiveTime) -> bool {
        let minute = time::minute_of_day(start);
        let first = time::minute_of_day(self.start_time);
        let last = time::minute_of_day(self.end_time) - i64::from(self.duration_minutes());
        let step = i64::from(self.interval_minutes);

        step > 0
            && self.duration_minutes() > 0
            && minute >= first
            && minute <= last
            && (minute - first) % step == 0
    }
}

impl IntoIterator for SlotGenerator {
    type Item = NaiveTime;
    type IntoIter = SlotStarts;

    fn into_iter(self) -> Self::IntoIter {
        self.starts()
    }
}

/// Iterator over candidate start times.
#[derive(Debug, Clone)]
pub struct SlotStarts {
    next: i64,
    last: i64,
    step: i64,
}

impl SlotStarts {
    fn empty() -> Self {
        Self {
            next: 1,
            last: 0,
            step: 1,
        }
    }
}

impl Iterator for SlotStarts {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let current = self.next;
        self.next += self.step;
        time::time_at_minute(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.next > self.last {
            return (0, Some(0));
        }
        let remaining = ((self.last - self.next) / self.step + 1) as usize;
        (remaining, Some(remaining))
    }
}
