/// Professional availability and slot listing
pub mod availability;
/// Reservation, rescheduling and booking lifecycle
pub mod booking;
