//! API routes for tourdesk-server

pub mod access;
pub mod bookings;
pub mod cart;
pub mod combos;
pub mod dashboard;
pub mod health;
pub mod referral;
pub mod reviews;
pub mod tours;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use shared::error::ApiResponse;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::capture_referral;
use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<ApiResponse<T>, ServiceError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUID v4 request IDs
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Any origin when the list is empty
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Storefront routes; `?ref=` is captured on all of them
fn public_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(tours::router())
        .merge(combos::router())
        .merge(reviews::router())
        .merge(referral::router())
        .merge(cart::router())
        .merge(bookings::router())
        .merge(access::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            capture_referral,
        ))
}

/// Create the combined router with all middleware and state
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(health::router())
        .merge(public_router(&state))
        .nest("/api/dashboard", dashboard::router(state.clone()))
        .layer(cors_layer(allowed_origins))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dashboard_auth::create_token;
    use crate::cache::keys;
    use crate::config::Config;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use shared::models::{DashboardRole, DashboardUser};
    use sqlx::PgPool;
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    fn test_state() -> AppState {
        let config = Config::from_lookup(|name| match name {
            "DATABASE_URL" => Some("postgres://tourdesk@localhost/tourdesk_test".into()),
            "JWT_SECRET" => Some(SECRET.into()),
            "WHATSAPP_NUMBER" => Some("+52 998 123 4567".into()),
            _ => None,
        })
        .unwrap();
        let pool = PgPool::connect_lazy(&config.database_url).unwrap();
        AppState::with_pool(pool, &config)
    }

    fn app() -> Router {
        create_router(test_state(), &[])
    }

    fn dashboard_user(role: DashboardRole) -> DashboardUser {
        DashboardUser {
            id: Uuid::new_v4(),
            email: "sofia@example.com".into(),
            name: "Sofía".into(),
            referral_code: "SOFIA001".into(),
            referral_link: "http://localhost:5173/?ref=SOFIA001".into(),
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

    fn token(role: DashboardRole) -> String {
        create_token(&dashboard_user(role), SECRET).unwrap()
    }

    /// Token for `user`, with the stored row already in the query cache
    async fn session(state: &AppState, user: &DashboardUser, token_role: DashboardRole) -> String {
        state
            .cache
            .insert(keys::dashboard_user(user.id), Some(user.clone()))
            .await;
        let claimed = DashboardUser {
            role: token_role,
            ..user.clone()
        };
        create_token(&claimed, SECRET).unwrap()
    }

    fn authed(method: &str, uri: &str, token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok_with_request_id() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "tourdesk-server");
    }

    #[tokio::test]
    async fn categories_listed_in_order() {
        let response = app()
            .oneshot(
                Request::get("/api/tours/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let categories = body["data"].as_array().unwrap();
        assert_eq!(categories.len(), 7);
        assert_eq!(categories[0], "Todos");
        assert_eq!(categories[6], "Romántico");
    }

    #[tokio::test]
    async fn ref_param_sets_referral_cookies() {
        let response = app()
            .oneshot(
                Request::get("/api/tours/categories?ref=maria123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<&str> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("referral_code=MARIA123;"));
        assert!(cookies[0].contains("Max-Age=2592000"));
        assert!(cookies[1].starts_with("referral_code_date="));
    }

    #[tokio::test]
    async fn no_ref_param_no_cookies() {
        let response = app()
            .oneshot(Request::get("/api/access").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn access_routes_by_session() {
        let response = app()
            .oneshot(Request::get("/api/access").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["sequence"], "cderf");
        assert_eq!(body["data"]["timeout_ms"], 2000);
        assert_eq!(body["data"]["route"], "/dashboard/login");

        let response = app()
            .oneshot(
                Request::get("/api/access")
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", token(DashboardRole::Affiliate)),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"]["authenticated"], true);
        assert_eq!(body["data"]["route"], "/dashboard");
    }

    #[tokio::test]
    async fn empty_cart_quotes_zero() {
        let response = app()
            .oneshot(post_json("/api/cart/quote", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["total"], 0.0);
        assert_eq!(body["data"]["total_items"], 0);
        assert!(body["data"]["referral"].is_null());
    }

    #[tokio::test]
    async fn quote_rejects_oversized_traveler_counts() {
        let response = app()
            .oneshot(post_json(
                "/api/cart/quote",
                r#"{"items":[{"tour_id":"00000000-0000-0000-0000-000000000000","adults":4294967295,"children":1,"date":"2099-01-01"}]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], 8);
        assert_eq!(body["details"]["field"], "adults");
    }

    #[tokio::test]
    async fn checkout_rejects_empty_cart() {
        let response = app()
            .oneshot(post_json(
                "/api/checkout",
                r#"{"customer":{"name":"Ana","email":"ana@example.com"},"items":[]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], 4002);
    }

    #[tokio::test]
    async fn checkout_rejects_bad_email() {
        let response = app()
            .oneshot(post_json(
                "/api/checkout",
                r#"{"customer":{"name":"Ana","email":"ana.example.com"},"items":[]}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], 6);
    }

    #[tokio::test]
    async fn review_submission_validated() {
        let response = app()
            .oneshot(post_json(
                "/api/reviews",
                r#"{"name":"Ana","rating":6,"comment":"Increíble"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], 5002);
    }

    #[tokio::test]
    async fn dashboard_requires_token() {
        let response = app()
            .oneshot(
                Request::get("/api/dashboard/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], 1001);
    }

    #[tokio::test]
    async fn logout_needs_no_session() {
        let response = app()
            .oneshot(post_json("/api/dashboard/logout", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn affiliates_cannot_manage_users() {
        let state = test_state();
        let affiliate = dashboard_user(DashboardRole::Affiliate);
        let token = session(&state, &affiliate, DashboardRole::Affiliate).await;
        let response = create_router(state, &[])
            .oneshot(authed("GET", "/api/dashboard/users", &token, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["code"], 2003);
    }

    #[tokio::test]
    async fn demoted_manager_loses_user_management() {
        let state = test_state();
        let demoted = dashboard_user(DashboardRole::Affiliate);
        let token = session(&state, &demoted, DashboardRole::Manager).await;
        let response = create_router(state, &[])
            .oneshot(authed("GET", "/api/dashboard/users", &token, ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["code"], 2003);
    }

    #[tokio::test]
    async fn deactivated_manager_cannot_reactivate_self() {
        let state = test_state();
        let mut manager = dashboard_user(DashboardRole::Manager);
        manager.is_active = false;
        let token = session(&state, &manager, DashboardRole::Manager).await;
        let response = create_router(state, &[])
            .oneshot(authed(
                "PUT",
                &format!("/api/dashboard/users/{}", manager.id),
                &token,
                r#"{"is_active":true}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], 1007);
    }

    #[tokio::test]
    async fn unknown_booking_status_rejected() {
        let state = test_state();
        let admin = dashboard_user(DashboardRole::Admin);
        let token = session(&state, &admin, DashboardRole::Admin).await;
        let response = create_router(state, &[])
            .oneshot(authed(
                "PUT",
                &format!("/api/dashboard/bookings/{}/status", Uuid::new_v4()),
                &token,
                r#"{"status":"refunded"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], 4006);
        assert_eq!(body["details"]["value"], "refunded");
    }

    #[tokio::test]
    async fn tour_validation_runs_before_store() {
        let state = test_state();
        let admin = dashboard_user(DashboardRole::Admin);
        let token = session(&state, &admin, DashboardRole::Admin).await;
        let response = create_router(state, &[])
            .oneshot(authed(
                "POST",
                "/api/dashboard/tours",
                &token,
                r#"{"title":"Buceo","category":"Acuático","price_adult":-5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], 3002);
    }
}
