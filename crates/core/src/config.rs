//! Engine-level settings.
//!
//! - `BOOKING_HORIZON_DAYS`: days ahead searched for reschedule proposals (default: 30)
//! - `MAX_SLOT_RANGE_DAYS`: longest date range a slot query may cover (default: 90)

use eyre::{Result, WrapErr};
use std::env;

pub const DEFAULT_HORIZON_DAYS: u32 = 30;
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub horizon_days: u32,
    pub max_range_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let horizon_days = match lookup("BOOKING_HORIZON_DAYS") {
            Some(value) => value.trim().parse().wrap_err("Invalid BOOKING_HORIZON_DAYS value")?,
            None => DEFAULT_HORIZON_DAYS,
        };
        let max_range_days = match lookup("MAX_SLOT_RANGE_DAYS") {
            Some(value) => value.trim().parse().wrap_err("Invalid MAX_SLOT_RANGE_DAYS value")?,
            None => DEFAULT_MAX_RANGE_DAYS,
        };

        if horizon_days == 0 || max_range_days == 0 {
            eyre::bail!("BOOKING_HORIZON_DAYS and MAX_SLOT_RANGE_DAYS must be positive");
        }
        if horizon_days > max_range_days {
            eyre::bail!("BOOKING_HORIZON_DAYS cannot exceed MAX_SLOT_RANGE_DAYS");
        }

        Ok(Self {
            horizon_days,
            max_range_days,
        })
    }
}
