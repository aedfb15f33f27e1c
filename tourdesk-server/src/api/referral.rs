//! Referral code lookup for the storefront banner

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{DashboardUser, ReferralInfo};
use shared::referral::normalize_code;

use super::ApiResult;
use crate::auth::ReferralCookie;
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/referral", get(current))
        .route("/api/referral/{code}", get(lookup))
}

fn info(user: DashboardUser) -> ReferralInfo {
    ReferralInfo {
        referral_code: user.referral_code,
        name: user.name,
        discount_percentage: user.discount_percentage,
    }
}

/// Public view of an active code
pub async fn lookup(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<ReferralInfo> {
    let invalid = || {
        AppError::with_message(ErrorCode::ReferralCodeInvalid, "Referral code is not active")
            .with_detail("code", code.clone())
    };
    let normalized = normalize_code(Some(&code)).ok_or_else(invalid)?;
    let user = db::dashboard_users::find_active_by_code(&state.pool, &normalized)
        .await?
        .ok_or_else(invalid)?;
    Ok(ApiResponse::success(info(user)))
}

/// Code remembered for this visitor, if it is still active
pub async fn current(
    State(state): State<AppState>,
    ReferralCookie(code): ReferralCookie,
) -> ApiResult<Option<ReferralInfo>> {
    let Some(code) = code else {
        return Ok(ApiResponse::success(None));
    };
    let user = db::dashboard_users::find_active_by_code(&state.pool, &code).await?;
    Ok(ApiResponse::success(user.map(info)))
}
