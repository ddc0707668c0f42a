use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/bookings", post(handlers::booking::reserve_slot))
        .route("/api/bookings/:id", get(handlers::booking::get_booking))
        .route(
            "/api/bookings/:id/reschedule",
            get(handlers::booking::propose_reschedule).post(handlers::booking::confirm_reschedule),
        )
        .route("/api/bookings/:id/confirm", post(handlers::booking::confirm_booking))
        .route("/api/bookings/:id/complete", post(handlers::booking::complete_booking))
        .route("/api/bookings/:id/cancel", post(handlers::booking::cancel_booking))
}
