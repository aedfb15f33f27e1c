//! Dashboard API, nested under `/api/dashboard`
//!
//! Login is public and rate limited; everything else needs a session token.
//! User management additionally needs an admin or manager role.

mod auth;
mod bookings;
mod referrals;
mod reviews;
mod tours;
mod users;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::{dashboard_auth_middleware, login_rate_limit, require_user_manager};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ))
        .route("/logout", post(auth::logout));

    let users = users::router().route_layer(middleware::from_fn(require_user_manager));

    let protected = Router::new()
        .route("/me", get(auth::me))
        .merge(tours::router())
        .merge(reviews::router())
        .merge(bookings::router())
        .merge(referrals::router())
        .merge(users)
        .route_layer(middleware::from_fn_with_state(
            state,
            dashboard_auth_middleware,
        ));

    login.merge(protected)
}
