//! Cart pricing and checkout

use axum::{Json, Router, extract::State, routing::post};
use shared::error::ApiResponse;
use shared::referral::resolve_code;

use super::ApiResult;
use crate::auth::ReferralCookie;
use crate::services::checkout::{self, CheckoutReceipt, CheckoutRequest, Quote, QuoteRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart/quote", post(quote))
        .route("/api/checkout", post(submit))
}

/// Price the cart. The body's referral code wins over the remembered one.
pub async fn quote(
    State(state): State<AppState>,
    ReferralCookie(remembered): ReferralCookie,
    Json(mut request): Json<QuoteRequest>,
) -> ApiResult<Quote> {
    request.referral_code = resolve_code(request.referral_code.as_deref(), remembered.as_deref());
    let quote = checkout::quote(&state.pool, &request).await?;
    Ok(ApiResponse::success(quote))
}

/// Create pending bookings and return the WhatsApp hand-off link
pub async fn submit(
    State(state): State<AppState>,
    ReferralCookie(remembered): ReferralCookie,
    Json(mut request): Json<CheckoutRequest>,
) -> ApiResult<CheckoutReceipt> {
    request.referral_code = resolve_code(request.referral_code.as_deref(), remembered.as_deref());
    let receipt = checkout::checkout(&state.pool, &state.whatsapp_number, &request).await?;
    if receipt.quote.referral.is_some() {
        state.cache.invalidate_dashboard_users().await;
    }
    Ok(ApiResponse::success(receipt))
}
