//! tourdesk-server: tour booking storefront backend
//!
//! Long-running service that:
//! - Serves the tour catalog, combos and verified reviews
//! - Prices carts with referral discounts and hands checkout off to WhatsApp
//! - Records pending bookings and affiliate referrals
//! - Provides the dashboard API (referral-code login, JWT sessions)

mod api;
mod auth;
mod cache;
mod config;
mod db;
mod error;
mod services;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use config::Config;
use error::BoxError;
use state::AppState;

/// Rate limiter and cache housekeeping interval
const CLEANUP_INTERVAL_SECS: u64 = 300;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourdesk_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting tourdesk-server (env: {})", config.environment);
    if config.is_development() {
        tracing::warn!("Development mode: unset secrets fall back to insecure defaults");
    }

    let state = AppState::new(&config).await?;
    let app = api::create_router(state.clone(), &config.cors_allowed_origins);

    // Periodic rate limiter and cache cleanup
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            state.rate_limiter.cleanup().await;
            state.cache.purge_expired().await;
        }
    });

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("tourdesk-server HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
