//! Public catalog endpoints

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use shared::checkout::{inquiry_message, whatsapp_url};
use shared::error::{ApiResponse, AppError};
use shared::models::{CATEGORIES, Review, Tour, category_filter};
use uuid::Uuid;

use super::ApiResult;
use crate::cache::{QueryKey, keys};
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tours", get(list))
        .route("/api/tours/featured", get(featured))
        .route("/api/tours/categories", get(categories))
        .route("/api/tours/{id}", get(get_by_id))
        .route("/api/tours/{id}/inquiry", get(inquiry))
        .route("/api/tours/{id}/reviews", get(reviews))
}

#[derive(Debug, Deserialize)]
pub struct TourQuery {
    pub category: Option<String>,
}

/// All tours, or one category (`Todos` means all)
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TourQuery>,
) -> ApiResult<Vec<Tour>> {
    let tours = match category_filter(query.category.as_deref()) {
        Some(category) => match category_cache_key(category) {
            Some(key) => {
                state
                    .cache
                    .get_or_load(key, || db::tours::find_by_category(&state.pool, category))
                    .await?
            }
            None => db::tours::find_by_category(&state.pool, category).await?,
        },
        None => all_tours(&state).await?,
    };
    Ok(ApiResponse::success(tours))
}

/// Only the fixed storefront categories are cached
fn category_cache_key(category: &str) -> Option<QueryKey> {
    CATEGORIES
        .contains(&category)
        .then(|| keys::tours_category(category))
}

pub async fn featured(State(state): State<AppState>) -> ApiResult<Vec<Tour>> {
    let tours = state
        .cache
        .get_or_load(keys::tours_featured(), || db::tours::find_featured(&state.pool))
        .await?;
    Ok(ApiResponse::success(tours))
}

pub async fn categories() -> ApiResult<Vec<&'static str>> {
    Ok(ApiResponse::success(CATEGORIES.to_vec()))
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Tour> {
    Ok(ApiResponse::success(find_tour(&state, id).await?))
}

#[derive(Debug, Serialize)]
pub struct Inquiry {
    pub message: String,
    pub whatsapp_url: String,
}

/// WhatsApp link asking about one tour
pub async fn inquiry(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Inquiry> {
    let tour = find_tour(&state, id).await?;
    let message = inquiry_message(&tour.title);
    let whatsapp_url = whatsapp_url(&state.whatsapp_number, &message);
    Ok(ApiResponse::success(Inquiry {
        message,
        whatsapp_url,
    }))
}

/// Verified reviews of one tour
pub async fn reviews(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vec<Review>> {
    let reviews = state
        .cache
        .get_or_load(keys::reviews_tour(id), || db::reviews::find_by_tour(&state.pool, id))
        .await?;
    Ok(ApiResponse::success(
        reviews.into_iter().filter(|r| r.verified).collect(),
    ))
}

pub(super) async fn all_tours(state: &AppState) -> ServiceResult<Vec<Tour>> {
    Ok(state
        .cache
        .get_or_load(keys::tours(), || db::tours::find_all(&state.pool))
        .await?)
}

pub(super) async fn find_tour(state: &AppState, id: Uuid) -> ServiceResult<Tour> {
    state
        .cache
        .get_or_load(keys::tour(id), || load_tour(state, id))
        .await
}

async fn load_tour(state: &AppState, id: Uuid) -> ServiceResult<Tour> {
    db::tours::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::tour_not_found(id).into())
}
