//! Review moderation

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use shared::error::{ApiResponse, AppError};
use shared::models::{Review, ReviewBuckets, ReviewUpdate};
use shared::util::now_millis;
use uuid::Uuid;

use crate::api::ApiResult;
use crate::cache::keys;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list))
        .route("/reviews/{id}", put(update).delete(delete))
        .route("/reviews/{id}/approve", post(approve))
        .route("/reviews/{id}/reject", post(reject))
}

/// All reviews split into pending and verified
pub async fn list(State(state): State<AppState>) -> ApiResult<ReviewBuckets> {
    let reviews = state
        .cache
        .get_or_load(keys::reviews(), || db::reviews::find_all(&state.pool))
        .await?;
    Ok(ApiResponse::success(ReviewBuckets::split(reviews)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<ReviewUpdate>,
) -> ApiResult<Review> {
    data.validate()?;
    let review = db::reviews::update(&state.pool, id, data, now_millis())
        .await?
        .ok_or_else(|| AppError::review_not_found(id))?;
    state.cache.invalidate_reviews().await;
    Ok(ApiResponse::success(review))
}

pub async fn approve(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Review> {
    set_verified(&state, id, true).await
}

pub async fn reject(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Review> {
    set_verified(&state, id, false).await
}

async fn set_verified(state: &AppState, id: Uuid, verified: bool) -> ApiResult<Review> {
    let review = db::reviews::set_verified(&state.pool, id, verified, now_millis())
        .await?
        .ok_or_else(|| AppError::review_not_found(id))?;
    state.cache.invalidate_reviews().await;
    tracing::info!(review_id = %id, verified, "Review moderated");
    Ok(ApiResponse::success(review))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    if !db::reviews::delete(&state.pool, id).await? {
        return Err(AppError::review_not_found(id).into());
    }
    state.cache.invalidate_reviews().await;
    tracing::info!(review_id = %id, "Review deleted");
    Ok(ApiResponse::ok())
}
