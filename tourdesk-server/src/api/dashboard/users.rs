//! Dashboard user management (admin / manager)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{
    DashboardRole, DashboardUser, DashboardUserCreate, DashboardUserStats, DashboardUserUpdate,
};
use shared::referral::{generate_code, normalize_code, referral_link};
use shared::util::now_millis;
use uuid::Uuid;

use crate::api::ApiResult;
use crate::cache::keys;
use crate::db;
use crate::db::dashboard_users::NewDashboardUser;
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;

/// Generated codes retried on collision
const MAX_CODE_ATTEMPTS: usize = 5;
const DEFAULT_COMMISSION_RATE: f64 = 10.0;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/lookup", get(by_email))
        .route("/users/{id}", get(get_by_id).put(update).delete(deactivate))
        .route("/users/{id}/stats", put(update_stats))
}

/// Map a unique violation to the conflicting field's error
fn conflict_or_db(e: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        let code = if db_err.constraint().is_some_and(|c| c.contains("email")) {
            ErrorCode::DashboardUserEmailExists
        } else {
            ErrorCode::ReferralCodeExists
        };
        return AppError::new(code).into();
    }
    e.into()
}

fn user_from_row(row: db::dashboard_users::DashboardUserRow) -> ServiceResult<DashboardUser> {
    Ok(DashboardUser::try_from(row)?)
}

/// Active users, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<DashboardUser>> {
    let users = state
        .cache
        .get_or_load(keys::dashboard_users(), || {
            db::dashboard_users::find_all_active(&state.pool)
        })
        .await?;
    Ok(ApiResponse::success(users))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DashboardUser> {
    let user = db::dashboard_users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))?;
    Ok(ApiResponse::success(user))
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// `?email=`, case-insensitive
pub async fn by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<DashboardUser> {
    let user = db::dashboard_users::find_by_email(&state.pool, &query.email)
        .await?
        .ok_or_else(|| AppError::user_not_found(query.email.trim()))?;
    Ok(ApiResponse::success(user))
}

/// Create an affiliate. A blank code is generated from the name.
pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<DashboardUserCreate>,
) -> ApiResult<DashboardUser> {
    data.validate()?;
    let explicit = normalize_code(data.referral_code.as_deref());
    let attempts = if explicit.is_some() { 1 } else { MAX_CODE_ATTEMPTS };

    let mut new_user = NewDashboardUser {
        email: data.email.trim().to_string(),
        name: data.name.trim().to_string(),
        referral_code: String::new(),
        referral_link: String::new(),
        discount_percentage: data.discount_percentage.unwrap_or(0.0),
        user_id: data.user_id,
        role: data.role.unwrap_or(DashboardRole::Affiliate),
        commission_rate: data.commission_rate.unwrap_or(DEFAULT_COMMISSION_RATE),
    };

    let mut attempt = 1;
    let row = loop {
        new_user.referral_code = explicit
            .clone()
            .unwrap_or_else(|| generate_code(&new_user.name));
        new_user.referral_link = referral_link(&state.public_base_url, &new_user.referral_code);

        match db::dashboard_users::create(&state.pool, &new_user, now_millis()).await {
            Ok(row) => break row,
            Err(e) => match conflict_or_db(e) {
                ServiceError::App(err)
                    if err.code == ErrorCode::ReferralCodeExists && attempt < attempts =>
                {
                    tracing::debug!(code = %new_user.referral_code, "Generated code taken, retrying");
                    attempt += 1;
                }
                err => return Err(err),
            },
        }
    };

    let user = user_from_row(row)?;
    state.cache.invalidate_dashboard_users().await;
    tracing::info!(user_id = %user.id, code = %user.referral_code, "Dashboard user created");
    Ok(ApiResponse::success(user))
}

/// Partial update; a new code regenerates the referral link
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut data): Json<DashboardUserUpdate>,
) -> ApiResult<DashboardUser> {
    data.validate()?;
    data.referral_code = normalize_code(data.referral_code.as_deref());
    let link = data
        .referral_code
        .as_deref()
        .map(|code| referral_link(&state.public_base_url, code));

    let row = db::dashboard_users::update(&state.pool, id, &data, link.as_deref(), now_millis())
        .await
        .map_err(conflict_or_db)?
        .ok_or_else(|| AppError::user_not_found(id))?;

    let user = user_from_row(row)?;
    state.cache.invalidate_dashboard_users().await;
    tracing::info!(user_id = %id, "Dashboard user updated");
    Ok(ApiResponse::success(user))
}

/// Soft delete
pub async fn deactivate(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    if !db::dashboard_users::deactivate(&state.pool, id, now_millis()).await? {
        return Err(AppError::user_not_found(id).into());
    }
    state.cache.invalidate_dashboard_users().await;
    tracing::info!(user_id = %id, "Dashboard user deactivated");
    Ok(ApiResponse::ok())
}

pub async fn update_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(stats): Json<DashboardUserStats>,
) -> ApiResult<DashboardUser> {
    if stats.total_referrals.is_some_and(|n| n < 0)
        || stats.total_earnings.is_some_and(|e| !e.is_finite() || e < 0.0)
    {
        return Err(AppError::new(ErrorCode::ValueOutOfRange).into());
    }
    let user = db::dashboard_users::update_stats(&state.pool, id, &stats, now_millis())
        .await?
        .ok_or_else(|| AppError::user_not_found(id))?;
    state.cache.invalidate_dashboard_users().await;
    Ok(ApiResponse::success(user))
}
