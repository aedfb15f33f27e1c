use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::models::{Referral, ReferralStatusUpdate};
use shared::referral::normalize_code;
use shared::util::now_millis;
use uuid::Uuid;

use crate::api::ApiResult;
use crate::auth::DashboardIdentity;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/referrals", get(list))
        .route("/referrals/mine", get(mine))
        .route("/referrals/user/{id}", get(by_user))
        .route("/referrals/{id}/status", put(update_status))
}

#[derive(Debug, Deserialize)]
pub struct ReferralQuery {
    pub code: Option<String>,
}

/// All referrals, or one code's (`?code=`)
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ReferralQuery>,
) -> ApiResult<Vec<Referral>> {
    let referrals = match normalize_code(query.code.as_deref()) {
        Some(code) => db::referrals::find_by_code(&state.pool, &code).await?,
        None => db::referrals::find_all(&state.pool).await?,
    };
    Ok(ApiResponse::success(referrals))
}

/// The logged-in affiliate's referrals
pub async fn mine(
    State(state): State<AppState>,
    Extension(identity): Extension<DashboardIdentity>,
) -> ApiResult<Vec<Referral>> {
    let referrals = db::referrals::find_by_user(&state.pool, identity.user_id).await?;
    Ok(ApiResponse::success(referrals))
}

pub async fn by_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Referral>> {
    let referrals = db::referrals::find_by_user(&state.pool, id).await?;
    Ok(ApiResponse::success(referrals))
}

/// Paying a referral credits the affiliate's earnings
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReferralStatusUpdate>,
) -> ApiResult<Referral> {
    let referral = db::referrals::update_status(&state.pool, id, req.status()?, now_millis())
        .await?
        .ok_or_else(|| AppError::referral_not_found(id))?;
    state.cache.invalidate_dashboard_users().await;
    tracing::info!(referral_id = %id, status = referral.status.as_db(), "Referral status changed");
    Ok(ApiResponse::success(referral))
}
