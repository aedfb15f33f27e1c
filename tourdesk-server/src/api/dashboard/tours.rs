//! Tour management

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use shared::error::{ApiResponse, AppError};
use shared::models::{Tour, TourCreate, TourUpdate};
use shared::util::now_millis;
use uuid::Uuid;

use crate::api::ApiResult;
use crate::api::tours::all_tours;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tours", get(list).post(create))
        .route("/tours/{id}", put(update).delete(delete))
        .route("/tours/{id}/featured", post(toggle_featured))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Tour>> {
    Ok(ApiResponse::success(all_tours(&state).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<TourCreate>,
) -> ApiResult<Tour> {
    data.validate()?;
    let tour = db::tours::create(&state.pool, data, now_millis()).await?;
    state.cache.invalidate_tours(Some(tour.id)).await;
    tracing::info!(tour_id = %tour.id, title = %tour.title, "Tour created");
    Ok(ApiResponse::success(tour))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<TourUpdate>,
) -> ApiResult<Tour> {
    data.validate()?;
    let tour = db::tours::update(&state.pool, id, data, now_millis())
        .await?
        .ok_or_else(|| AppError::tour_not_found(id))?;
    state.cache.invalidate_tours(Some(id)).await;
    tracing::info!(tour_id = %id, "Tour updated");
    Ok(ApiResponse::success(tour))
}

pub async fn toggle_featured(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Tour> {
    let tour = db::tours::toggle_featured(&state.pool, id, now_millis())
        .await?
        .ok_or_else(|| AppError::tour_not_found(id))?;
    state.cache.invalidate_tours(Some(id)).await;
    tracing::info!(tour_id = %id, featured = tour.featured, "Tour featured flag toggled");
    Ok(ApiResponse::success(tour))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    if !db::tours::delete(&state.pool, id).await? {
        return Err(AppError::tour_not_found(id).into());
    }
    state.cache.invalidate_tours(Some(id)).await;
    tracing::info!(tour_id = %id, "Tour deleted");
    Ok(ApiResponse::ok())
}
