//! Booking Model

use crate::error::{AppError, AppResult, ErrorCode};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// `TD-YYYYMMDD-XXXXXX`
    pub booking_number: String,
    pub tour_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    /// YYYY-MM-DD
    pub booking_date: String,
    pub adults: i32,
    pub children: i32,
    pub infants: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub referral_code: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create booking payload. Status is always `pending`, number is generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreate {
    pub tour_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub booking_date: String,
    pub adults: i32,
    #[serde(default)]
    pub children: i32,
    #[serde(default)]
    pub infants: i32,
    pub total_price: f64,
    pub notes: Option<String>,
    pub referral_code: Option<String>,
}

/// Status change (dashboard)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: String,
}

impl BookingStatusUpdate {
    /// Unknown values are rejected with `BookingInvalidStatus`
    pub fn status(&self) -> AppResult<BookingStatus> {
        let raw = self.status.trim();
        BookingStatus::from_db(&raw.to_ascii_lowercase()).ok_or_else(|| {
            AppError::field(ErrorCode::BookingInvalidStatus, "status").with_detail("value", raw)
        })
    }
}

/// Customer contact captured at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl CustomerInfo {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::required("name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AppError::required("email"));
        }
        if !email.contains('@') {
            return Err(AppError::with_message(
                ErrorCode::InvalidFormat,
                "Invalid email address",
            )
            .with_detail("field", "email"));
        }
        Ok(())
    }
}

const BOOKING_SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a booking number: `TD-YYYYMMDD-XXXXXX`
pub fn generate_booking_number(date: NaiveDate) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BOOKING_SUFFIX_CHARS[rng.gen_range(0..BOOKING_SUFFIX_CHARS.len())] as char)
        .collect();
    format!("TD-{}-{}", date.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_db_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::from_db(status.as_db()), Some(status));
        }
        assert_eq!(BookingStatus::from_db("refunded"), None);
    }

    #[test]
    fn status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }

    #[test]
    fn status_update_parsed_or_rejected() {
        let s: BookingStatusUpdate = serde_json::from_str(r#"{"status":" Cancelled "}"#).unwrap();
        assert_eq!(s.status().unwrap(), BookingStatus::Cancelled);

        let s: BookingStatusUpdate = serde_json::from_str(r#"{"status":"refunded"}"#).unwrap();
        let err = s.status().unwrap_err();
        assert_eq!(err.code, ErrorCode::BookingInvalidStatus);
        assert_eq!(err.details.unwrap().get("value").unwrap(), "refunded");
    }

    #[test]
    fn booking_number_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let number = generate_booking_number(date);
        assert_eq!(number.len(), "TD-20250307-XXXXXX".len());
        assert!(number.starts_with("TD-20250307-"));
        assert!(
            number[12..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn customer_validation() {
        let mut c = CustomerInfo {
            name: "Luis".into(),
            email: "luis@example.com".into(),
            phone: None,
            notes: None,
        };
        assert!(c.validate().is_ok());
        c.email = "luis".into();
        assert_eq!(c.validate().unwrap_err().code, ErrorCode::InvalidFormat);
        c.name = String::new();
        assert_eq!(c.validate().unwrap_err().code, ErrorCode::RequiredField);
    }
}
