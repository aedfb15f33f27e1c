//! Dashboard session tokens
//!
//! Logging in with an active referral code yields a JWT carrying the user id,
//! code and role. Dashboard routes require it as a bearer token; the stored
//! user is re-read on every request, so deactivation and role changes apply
//! before the token expires.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::HeaderMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{DashboardRole, DashboardUser};
use uuid::Uuid;

use crate::cache::keys;
use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

/// JWT claims for dashboard sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardClaims {
    /// Dashboard user ID
    pub sub: String,
    /// Referral code used to log in
    pub code: String,
    pub role: DashboardRole,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated dashboard identity extracted from JWT
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardIdentity {
    pub user_id: Uuid,
    pub referral_code: String,
    pub role: DashboardRole,
}

pub const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a session token for a dashboard user
pub fn create_token(
    user: &DashboardUser,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = DashboardClaims {
        sub: user.id.to_string(),
        code: user.referral_code.clone(),
        role: user.role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and extract the identity
pub fn verify_token(token: &str, secret: &str) -> Result<DashboardIdentity, AppError> {
    let token_data = jsonwebtoken::decode::<DashboardClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid or expired token"),
        }
    })?;

    let user_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::invalid_token("Invalid token subject"))?;

    Ok(DashboardIdentity {
        user_id,
        referral_code: token_data.claims.code,
        role: token_data.claims.role,
    })
}

/// Bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotAuthenticated, "Missing Authorization header")
        })?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))
}

/// Identity when a valid token is present, without failing the request
pub fn optional_identity(headers: &HeaderMap, secret: &str) -> Option<DashboardIdentity> {
    let token = bearer_token(headers).ok()?;
    verify_token(token, secret).ok()
}

/// Identity from the stored user; the token only names who is asking
pub fn authorize(
    claimed: DashboardIdentity,
    stored: Option<DashboardUser>,
) -> Result<DashboardIdentity, AppError> {
    let user = stored.ok_or_else(|| {
        AppError::invalid_token("Unknown dashboard user")
            .with_detail("id", claimed.user_id.to_string())
    })?;
    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Session of deactivated dashboard user rejected");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    if user.role != claimed.role {
        tracing::debug!(
            user_id = %user.id,
            token_role = claimed.role.as_db(),
            role = user.role.as_db(),
            "Role changed since login"
        );
    }
    Ok(DashboardIdentity {
        user_id: user.id,
        referral_code: user.referral_code,
        role: user.role,
    })
}

/// Middleware that verifies the dashboard JWT from the Authorization header
/// and checks it against the stored user
pub async fn dashboard_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let claimed = bearer_token(request.headers())
        .and_then(|token| verify_token(token, &state.jwt_secret))
        .map_err(IntoResponse::into_response)?;

    let stored = state
        .cache
        .get_or_load(keys::dashboard_user(claimed.user_id), || {
            db::dashboard_users::find_by_id(&state.pool, claimed.user_id)
        })
        .await
        .map_err(|e| ServiceError::from(e).into_response())?;

    let identity = authorize(claimed, stored).map_err(IntoResponse::into_response)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Middleware for user management: admin or manager only.
///
/// Must run AFTER dashboard_auth_middleware (requires DashboardIdentity).
pub async fn require_user_manager(request: Request, next: Next) -> Result<Response, Response> {
    let identity = request
        .extensions()
        .get::<DashboardIdentity>()
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    if !identity.role.can_manage_users() {
        tracing::warn!(
            user_id = %identity.user_id,
            role = identity.role.as_db(),
            "User management denied"
        );
        return Err(AppError::new(ErrorCode::AdminRequired).into_response());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: DashboardRole) -> DashboardUser {
        DashboardUser {
            id: Uuid::new_v4(),
            email: "maria@example.com".into(),
            name: "María".into(),
            referral_code: "MARIA123".into(),
            referral_link: "http://localhost:5173/?ref=MARIA123".into(),
            discount_percentage: 10.0,
            user_id: None,
            role,
            total_referrals: 0,
            total_earnings: 0.0,
            commission_rate: 10.0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn token_roundtrip() {
        let u = user(DashboardRole::Manager);
        let token = create_token(&u, "secret").unwrap();
        let identity = verify_token(&token, "secret").unwrap();
        assert_eq!(identity.user_id, u.id);
        assert_eq!(identity.referral_code, "MARIA123");
        assert_eq!(identity.role, DashboardRole::Manager);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = create_token(&user(DashboardRole::Admin), "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn expired_token_reports_expiry() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = DashboardClaims {
            sub: Uuid::new_v4().to_string(),
            code: "OLD001".into(),
            role: DashboardRole::Affiliate,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let err = verify_token(&token, "secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            bearer_token(&headers).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );

        headers.insert(http::header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap_err().code, ErrorCode::TokenInvalid);

        headers.insert(http::header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
        assert!(optional_identity(&headers, "secret").is_none());
    }

    fn claimed(u: &DashboardUser, role: DashboardRole) -> DashboardIdentity {
        DashboardIdentity {
            user_id: u.id,
            referral_code: u.referral_code.clone(),
            role,
        }
    }

    #[test]
    fn stored_role_wins_over_token() {
        let demoted = user(DashboardRole::Affiliate);
        let identity =
            authorize(claimed(&demoted, DashboardRole::Manager), Some(demoted.clone())).unwrap();
        assert_eq!(identity.role, DashboardRole::Affiliate);
        assert!(!identity.role.can_manage_users());
    }

    #[test]
    fn deactivated_or_missing_user_rejected() {
        let mut u = user(DashboardRole::Admin);
        u.is_active = false;
        let err = authorize(claimed(&u, DashboardRole::Admin), Some(u.clone())).unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);

        let err = authorize(claimed(&u, DashboardRole::Admin), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }
}
