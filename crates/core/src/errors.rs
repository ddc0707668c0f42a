use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a commit against the booking ledger was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    /// Another pending or confirmed booking occupies an overlapping,
    /// buffer-expanded interval.
    SlotAlreadyTaken,
    /// The professional's schedule no longer offers the slot.
    SlotNoLongerAvailable,
}

impl ConflictKind {
    pub fn code(&self) -> &'static str {
        match self {
            ConflictKind::SlotAlreadyTaken => "SLOT_ALREADY_TAKEN",
            ConflictKind::SlotNoLongerAvailable => "SLOT_NO_LONGER_AVAILABLE",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Booking conflict: {0}")]
    Conflict(ConflictKind),

    #[error("Invalid booking state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            BookingError::Conflict(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<ConflictKind> for BookingError {
    fn from(kind: ConflictKind) -> Self {
        BookingError::Conflict(kind)
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
