//! Unified error system for TourDesk
//!
//! - [`ErrorCode`]: numeric codes shared with the storefront frontend
//! - [`ErrorCategory`]: classification of codes by domain
//! - [`AppError`]: error with code, message and optional details
//! - [`ApiResponse`]: response envelope used by every endpoint
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Catalog errors
//! - 4xxx: Booking errors
//! - 5xxx: Review errors
//! - 6xxx: Referral errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::field(ErrorCode::ReviewInvalidRating, "rating");
//! assert_eq!(err.code.code(), 5002);
//!
//! let response: ApiResponse<()> = err.into();
//! assert_eq!(response.code, Some(5002));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
