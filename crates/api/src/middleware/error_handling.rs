//! # Error Handling Middleware
//!
//! Maps [`BookingError`] onto HTTP status codes and JSON bodies so every
//! handler reports failures the same way.
//!
//! | error                 | status |
//! |-----------------------|--------|
//! | `NotFound`            | 404    |
//! | `Validation`          | 400    |
//! | `Conflict`            | 409    |
//! | `InvalidState`        | 409    |
//! | `Database`/`Internal` | 500    |
//!
//! Conflicts also carry a machine-readable `code` so clients can tell a
//! taken slot from one that is no longer offered.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use slotwise_core::errors::BookingError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use slotwise_api::middleware::error_handling::AppError;
/// use slotwise_core::errors::BookingError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(AppError(BookingError::NotFound("Booking not found".into())));
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Conflict(_) | BookingError::InvalidState(_) => StatusCode::CONFLICT,
            BookingError::Database(_) | BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let message = self.0.to_string();
        let body = match self.0.conflict_kind() {
            Some(kind) => json!({ "error": message, "code": kind.code() }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}
