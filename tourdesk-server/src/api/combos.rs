//! Combo endpoints (read-only)

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::{ApiResponse, AppError};
use shared::models::{Combo, ComboWithTours};
use uuid::Uuid;

use super::ApiResult;
use super::tours::all_tours;
use crate::cache::keys;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/combos", get(list))
        .route("/api/combos/{id}", get(get_by_id))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ComboWithTours>> {
    let combos = state
        .cache
        .get_or_load(keys::combos(), || load_all(&state))
        .await?;
    Ok(ApiResponse::success(combos))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ComboWithTours> {
    let combo = state
        .cache
        .get_or_load(keys::combo(id), || load_one(&state, id))
        .await?;
    Ok(ApiResponse::success(combo))
}

async fn load_all(state: &AppState) -> ServiceResult<Vec<ComboWithTours>> {
    let combos = db::combos::find_all(&state.pool).await?;
    let tours = all_tours(state).await?;
    Ok(combos
        .into_iter()
        .map(|combo| ComboWithTours::resolve(combo, &tours))
        .collect())
}

async fn load_one(state: &AppState, id: Uuid) -> ServiceResult<ComboWithTours> {
    let combo: Combo = db::combos::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::combo_not_found(id))?;
    let tours = db::tours::find_by_ids(&state.pool, &combo.tour_ids).await?;
    Ok(ComboWithTours::resolve(combo, &tours))
}
