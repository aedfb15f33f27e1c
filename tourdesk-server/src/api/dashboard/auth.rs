//! Dashboard session endpoints: login, logout, me

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::DashboardUser;
use shared::referral::normalize_code;

use crate::api::ApiResult;
use crate::auth::DashboardIdentity;
use crate::auth::dashboard_auth::create_token;
use crate::db;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub referral_code: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: DashboardUser,
}

/// POST /api/dashboard/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let code = normalize_code(Some(&req.referral_code)).ok_or_else(|| {
        AppError::with_message(ErrorCode::InvalidCredentials, "Referral code is required")
    })?;

    let user = db::dashboard_users::find_active_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| {
            tracing::info!(code = %code, "Dashboard login rejected");
            AppError::invalid_credentials()
        })?;

    let token = create_token(&user, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(user_id = %user.id, role = user.role.as_db(), "Dashboard login");
    Ok(ApiResponse::success(LoginResponse { token, user }))
}

/// POST /api/dashboard/logout
///
/// Sessions are stateless; the client drops its token.
pub async fn logout() -> ApiResponse<()> {
    ApiResponse::ok()
}

/// GET /api/dashboard/me
///
/// Re-reads the user so role and stats changes show up without a new login.
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<DashboardIdentity>,
) -> ApiResult<DashboardUser> {
    let user = db::dashboard_users::find_by_id(&state.pool, identity.user_id)
        .await?
        .ok_or_else(|| AppError::user_not_found(identity.user_id))?;
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }
    Ok(ApiResponse::success(user))
}
