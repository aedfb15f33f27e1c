use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::models::{Booking, BookingStatusUpdate};
use shared::util::now_millis;
use uuid::Uuid;

use crate::api::ApiResult;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list))
        .route("/bookings/{id}", get(get_by_id))
        .route("/bookings/{id}/status", put(update_status))
}

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub email: Option<String>,
}

/// All bookings, or one customer's (`?email=`)
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> ApiResult<Vec<Booking>> {
    let bookings = match query.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => {
            db::bookings::find_by_email(&state.pool, email).await?
        }
        _ => db::bookings::find_all(&state.pool).await?,
    };
    Ok(ApiResponse::success(bookings))
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Booking> {
    let booking = db::bookings::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::booking_not_found(id))?;
    Ok(ApiResponse::success(booking))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<BookingStatusUpdate>,
) -> ApiResult<Booking> {
    let booking = db::bookings::update_status(&state.pool, id, req.status()?, now_millis())
        .await?
        .ok_or_else(|| AppError::booking_not_found(id))?;
    tracing::info!(
        booking_number = %booking.booking_number,
        status = booking.status.as_db(),
        "Booking status changed"
    );
    Ok(ApiResponse::success(booking))
}
