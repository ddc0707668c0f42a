//! # Availability Handlers
//!
//! Reading and replacing a professional's schedule rules, and listing the
//! slots customers can currently book.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use std::sync::Arc;
use slotwise_core::{
    errors::BookingError,
    models::{
        schedule::{ProfessionalAvailability, UpdateAvailabilityRequest, UpdateAvailabilityResponse},
        slot::{SlotListResponse, SlotQuery},
    },
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Returns the stored availability record of a professional.
///
/// # Endpoint
///
/// ```text
/// GET /api/professionals/:id/availability
/// ```
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<ProfessionalAvailability>, AppError> {
    let availability = state.engine.get_availability(professional_id).await?;
    Ok(Json(availability))
}

/// Replaces the availability record of a professional.
///
/// The whole record is overwritten. When `auto_decline` is set, pending
/// bookings that no longer fit are cancelled and their ids returned.
///
/// # Endpoint
///
/// ```text
/// PUT /api/professionals/:id/availability
/// ```
#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
    payload: Result<Json<UpdateAvailabilityRequest>, JsonRejection>,
) -> Result<Json<UpdateAvailabilityResponse>, AppError> {
    let Json(request) = payload.map_err(rejected_body)?;
    let response = state
        .engine
        .update_availability(professional_id, request)
        .await?;
    Ok(Json(response))
}

/// Lists bookable slots between `from` and `to`, both inclusive.
///
/// # Endpoint
///
/// ```text
/// GET /api/professionals/:id/slots?from=2026-10-19&to=2026-10-23
/// ```
#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    Path(professional_id): Path<Uuid>,
    query: Result<Query<SlotQuery>, QueryRejection>,
) -> Result<Json<SlotListResponse>, AppError> {
    let Query(query) = query
        .map_err(|err| AppError(BookingError::Validation(err.body_text())))?;

    let slots = state
        .engine
        .list_available_slots(professional_id, query.from, query.to)
        .await?;

    Ok(Json(SlotListResponse { slots }))
}

/// Malformed request bodies are validation failures, not 422s.
pub(crate) fn rejected_body(err: JsonRejection) -> AppError {
    AppError(BookingError::Validation(err.body_text()))
}
