use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use slotwise_core::models::{
    booking::{Booking, ConfirmRescheduleRequest, ReserveSlotRequest},
    slot::SlotListResponse,
};
use uuid::Uuid;

use crate::{handlers::availability::rejected_body, middleware::error_handling::AppError, ApiState};

/// `POST /api/bookings`: reserves a slot. Conflicts come back as 409 with a `code`.
#[axum::debug_handler]
pub async fn reserve_slot(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<ReserveSlotRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(request) = payload.map_err(rejected_body)?;

    let booking = state
        .engine
        .reserve_slot(
            request.professional_id,
            request.customer_id,
            request.date,
            request.start_time,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.get_booking(booking_id).await?))
}

/// `GET /api/bookings/:id/reschedule`: slots the booking could move to.
#[axum::debug_handler]
pub async fn propose_reschedule(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<SlotListResponse>, AppError> {
    let slots = state.engine.propose_reschedule(booking_id).await?;
    Ok(Json(SlotListResponse { slots }))
}

/// `POST /api/bookings/:id/reschedule`
#[axum::debug_handler]
pub async fn confirm_reschedule(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
    payload: Result<Json<ConfirmRescheduleRequest>, JsonRejection>,
) -> Result<Json<Booking>, AppError> {
    let Json(request) = payload.map_err(rejected_body)?;

    let booking = state
        .engine
        .confirm_reschedule(booking_id, request.date, request.start_time)
        .await?;

    Ok(Json(booking))
}

#[axum::debug_handler]
pub async fn confirm_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.confirm_booking(booking_id).await?))
}

#[axum::debug_handler]
pub async fn complete_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.complete_booking(booking_id).await?))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.cancel_booking(booking_id).await?))
}
