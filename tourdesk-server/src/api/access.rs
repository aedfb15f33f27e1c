//! Hidden dashboard entry
//!
//! The storefront runs the keystroke detector client-side; this endpoint
//! hands it the configured sequence and where to go when it fires.

use axum::{Router, extract::State, routing::get};
use http::HeaderMap;
use serde::Serialize;
use shared::access::access_route;
use shared::error::ApiResponse;

use super::ApiResult;
use crate::auth::dashboard_auth::optional_identity;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/access", get(access))
}

#[derive(Debug, Serialize)]
pub struct AccessInfo {
    pub sequence: String,
    pub timeout_ms: u64,
    pub authenticated: bool,
    /// Route to open when the sequence is typed
    pub route: &'static str,
}

pub async fn access(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<AccessInfo> {
    let authenticated = optional_identity(&headers, &state.jwt_secret).is_some();
    Ok(ApiResponse::success(AccessInfo {
        sequence: state.access.sequence.clone(),
        timeout_ms: state.access.timeout_ms,
        authenticated,
        route: access_route(authenticated),
    }))
}
