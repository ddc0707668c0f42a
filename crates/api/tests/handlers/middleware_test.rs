use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rstest::rstest;
use serde_json::Value;
use slotwise_api::middleware::error_handling::AppError;
use slotwise_core::errors::{BookingError, ConflictKind};

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[rstest]
#[case(BookingError::NotFound("Booking not found".to_string()), StatusCode::NOT_FOUND)]
#[case(BookingError::Validation("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(BookingError::Conflict(ConflictKind::SlotAlreadyTaken), StatusCode::CONFLICT)]
#[case(BookingError::Conflict(ConflictKind::SlotNoLongerAvailable), StatusCode::CONFLICT)]
#[case(BookingError::InvalidState("Booking is cancelled".to_string()), StatusCode::CONFLICT)]
#[case(BookingError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] status: StatusCode) {
    let error = AppError::from(error);
    assert_eq!(error.status(), status);
    assert_eq!(error.into_response().status(), status);
}

#[test]
fn test_error_handling_internal() {
    let error = BookingError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    let response = AppError(error).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test_log::test(tokio::test)]
async fn test_storage_failure_body_has_no_code() {
    let error: BookingError = eyre::eyre!("pool timed out").into();

    let body = body_json(AppError(error).into_response()).await;

    assert_eq!(body["error"], "Database error: pool timed out");
    assert!(body.get("code").is_none());
}

#[test_log::test(tokio::test)]
async fn test_conflict_body_carries_code() {
    let response = AppError(BookingError::Conflict(ConflictKind::SlotAlreadyTaken)).into_response();

    let body = body_json(response).await;

    assert_eq!(body["code"], "SLOT_ALREADY_TAKEN");
    assert_eq!(body["error"], "Booking conflict: SLOT_ALREADY_TAKEN");
}
