//! Server configuration

use shared::access::{AccessConfig, DEFAULT_SEQUENCE, DEFAULT_TIMEOUT_MS};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be set in {environment} environment")]
    SecretRequired {
        name: &'static str,
        environment: String,
    },
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// TourDesk server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for dashboard sessions
    pub jwt_secret: String,
    /// Number bookings are handed off to (digits only in the final link)
    pub whatsapp_number: String,
    /// Storefront origin used in referral links
    pub public_base_url: String,
    /// Query cache TTL
    pub cache_ttl_secs: u64,
    /// Lifetime of the captured referral cookie
    pub referral_cookie_days: u32,
    pub access: AccessConfig,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let database_url = var("DATABASE_URL")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            http_port: parse_or(&var, "HTTP_PORT", 8080)?,
            jwt_secret: require_secret(&var, "JWT_SECRET", &environment)?,
            whatsapp_number: var("WHATSAPP_NUMBER").unwrap_or_else(|| "1234567890".into()),
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:5173".into()),
            cache_ttl_secs: parse_or(&var, "CACHE_TTL_SECS", 60)?,
            referral_cookie_days: parse_or(&var, "REFERRAL_COOKIE_DAYS", 30)?,
            access: AccessConfig {
                sequence: var("ACCESS_SEQUENCE")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SEQUENCE.into()),
                timeout_ms: parse_or(&var, "ACCESS_SEQUENCE_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            },
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|list| {
                    list.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Require a secret env var: must be set and non-empty in non-development environments.
fn require_secret(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    environment: &str,
) -> Result<String, ConfigError> {
    match var(name).filter(|s| !s.is_empty()) {
        Some(value) => Ok(value),
        None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
        None => Err(ConfigError::SecretRequired {
            name,
            environment: environment.to_string(),
        }),
    }
}
