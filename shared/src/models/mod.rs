//! Data models
//!
//! Shared between tourdesk-server and the storefront (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! records with status enums or loosely typed columns go through row adapters
//! in the server's `db` modules instead.
//! All IDs are UUIDs, timestamps are Unix millis.

pub mod booking;
pub mod combo;
pub mod dashboard_user;
pub mod referral;
pub mod review;
pub mod tour;

// Re-exports
pub use booking::*;
pub use combo::*;
pub use dashboard_user::*;
pub use referral::*;
pub use review::*;
pub use tour::*;
