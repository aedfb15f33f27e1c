//! `?ref=CODE` capture
//!
//! Any public request carrying a `ref` query parameter stores the code in the
//! referral cookies. Handlers read it back through [`ReferralCookie`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderValue, header, request::Parts};
use shared::referral::{capture_cookies, code_from_cookie, normalize_code};
use shared::util::now_millis;

use crate::state::AppState;

/// Code captured from the current request's query string
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedReferral(pub String);

/// `ref` parameter from a raw query string, normalised
pub fn ref_param(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "ref" {
            return None;
        }
        let plus_decoded = value.replace('+', " ");
        let decoded = urlencoding::decode(&plus_decoded).ok()?;
        normalize_code(Some(&decoded))
    })
}

/// Store a `?ref=` code in the referral cookies
pub async fn capture_referral(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let captured = request.uri().query().and_then(ref_param);
    if let Some(code) = &captured {
        tracing::debug!(code = %code, "Referral code captured");
        request
            .extensions_mut()
            .insert(CapturedReferral(code.clone()));
    }

    let mut response = next.run(request).await;

    if let Some(code) = captured {
        for cookie in capture_cookies(&code, now_millis(), state.referral_cookie_days) {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::warn!(error = %e, "Referral cookie not set"),
            }
        }
    }
    response
}

/// Referral code known for this request: captured now, else from the cookie
#[derive(Debug, Clone, PartialEq)]
pub struct ReferralCookie(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ReferralCookie {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(CapturedReferral(code)) = parts.extensions.get::<CapturedReferral>() {
            return Ok(Self(Some(code.clone())));
        }
        let code = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(code_from_cookie);
        Ok(Self(code))
    }
}
