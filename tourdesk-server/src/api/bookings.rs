use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::{ApiResponse, AppError};
use shared::models::Booking;

use super::ApiResult;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/bookings/{number}", get(get_by_number))
}

/// Look up a booking by its `TD-...` number
pub async fn get_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Booking> {
    let number = number.trim().to_uppercase();
    let booking = db::bookings::find_by_number(&state.pool, &number)
        .await?
        .ok_or_else(|| AppError::booking_not_found(&number))?;
    Ok(ApiResponse::success(booking))
}
