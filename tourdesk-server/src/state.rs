//! Application state for tourdesk-server

use shared::access::AccessConfig;
use sqlx::PgPool;
use std::time::Duration;

use crate::auth::rate_limit::RateLimiter;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::error::BoxError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for dashboard sessions
    pub jwt_secret: String,
    pub whatsapp_number: String,
    pub public_base_url: String,
    pub referral_cookie_days: u32,
    pub access: AccessConfig,
    /// Read-through cache for catalog and review queries
    pub cache: QueryCache,
    /// Rate limiter for the dashboard login route
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::with_pool(pool, config))
    }

    /// Build the state around an existing pool
    pub fn with_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            whatsapp_number: config.whatsapp_number.clone(),
            public_base_url: config.public_base_url.clone(),
            referral_cookie_days: config.referral_cookie_days,
            access: config.access.clone(),
            cache: QueryCache::new(Duration::from_secs(config.cache_ttl_secs)),
            rate_limiter: RateLimiter::new(),
        }
    }
}
