//! Public review endpoints

use axum::{Json, Router, extract::State, routing::get};
use shared::error::{ApiResponse, AppError};
use shared::models::{Review, ReviewCreate};
use shared::util::now_millis;

use super::ApiResult;
use crate::cache::keys;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/reviews", get(verified).post(submit))
}

/// Verified reviews, newest first
pub async fn verified(State(state): State<AppState>) -> ApiResult<Vec<Review>> {
    let reviews = state
        .cache
        .get_or_load(keys::reviews_verified(), || {
            db::reviews::find_verified(&state.pool)
        })
        .await?;
    Ok(ApiResponse::success(reviews))
}

/// Submit a review; it stays hidden until approved
pub async fn submit(
    State(state): State<AppState>,
    Json(data): Json<ReviewCreate>,
) -> ApiResult<Review> {
    data.validate()?;
    if let Some(tour_id) = data.tour_id
        && db::tours::find_by_id(&state.pool, tour_id).await?.is_none()
    {
        return Err(AppError::tour_not_found(tour_id).into());
    }

    let review = db::reviews::create(&state.pool, data, now_millis()).await?;
    state.cache.invalidate_reviews().await;
    tracing::info!(review_id = %review.id, rating = review.rating, "Review submitted");

    Ok(ApiResponse::success_with_message(
        "Review submitted for moderation",
        review,
    ))
}
