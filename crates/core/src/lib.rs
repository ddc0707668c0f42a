//! # Slotwise Core
//!
//! Availability and booking-slot resolution for service professionals.
//!
//! - [`slots`]: candidate start times for one open window
//! - [`availability`]: bookable slots over a date range
//! - [`guard`]: race-free commit of a chosen slot
//! - [`reschedule`]: moving a booking to another slot
//! - [`engine`]: the facade callers use
//!
//! Storage, clock and event delivery are reached through the traits in
//! [`store`], [`clock`] and [`sink`].

pub mod availability;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod guard;
pub mod models;
pub mod reschedule;
pub mod sink;
pub mod slots;
pub mod store;

pub use engine::BookingEngine;
pub use errors::{BookingError, BookingResult, ConflictKind};
