//! Shared types for TourDesk
//!
//! Domain models, error codes, the API response envelope, and the pure logic
//! of the storefront: cart arithmetic, referral discounts, the WhatsApp
//! checkout message and the dashboard access sequence.

pub mod access;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod models;
pub mod pricing;
pub mod referral;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
