//! `AppError` and the `ApiResponse` envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use thiserror::Error;

/// Error carried to the storefront as `{code, message, details}`
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Offending field, resource id and similar context
    pub details: Option<HashMap<String, Value>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// `code` tagged with the offending field
    pub fn field(code: ErrorCode, field: &str) -> Self {
        Self::new(code).with_detail("field", field)
    }

    pub fn required(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{field} is required"))
            .with_detail("field", field)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    fn missing(code: ErrorCode, key: impl Display) -> Self {
        Self::new(code).with_detail("id", key.to_string())
    }

    pub fn tour_not_found(id: impl Display) -> Self {
        Self::missing(ErrorCode::TourNotFound, id)
    }

    pub fn combo_not_found(id: impl Display) -> Self {
        Self::missing(ErrorCode::ComboNotFound, id)
    }

    /// `key` is a UUID or a booking number
    pub fn booking_not_found(key: impl Display) -> Self {
        Self::missing(ErrorCode::BookingNotFound, key)
    }

    pub fn review_not_found(id: impl Display) -> Self {
        Self::missing(ErrorCode::ReviewNotFound, id)
    }

    pub fn referral_not_found(id: impl Display) -> Self {
        Self::missing(ErrorCode::ReferralNotFound, id)
    }

    /// `key` is a UUID or an email
    pub fn user_not_found(key: impl Display) -> Self {
        Self::missing(ErrorCode::DashboardUserNotFound, key)
    }
}

/// Envelope for every endpoint: `code` 0 and `data` on success,
/// `code`, `message` and optional `details` on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message("OK", data)
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: message.into(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn ok() -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error");
        }
        let status = self.http_status();
        (status, axum::Json(ApiResponse::<()>::from(self))).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code {
            None | Some(0) => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };
        (status, axum::Json(self)).into_response()
    }
}
