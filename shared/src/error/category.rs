//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Catalog errors
/// - 4xxx: Booking errors
/// - 5xxx: Review errors
/// - 6xxx: Referral errors
/// - 7xxx and above: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Catalog errors (3xxx)
    Catalog,
    /// Booking errors (4xxx)
    Booking,
    /// Review errors (5xxx)
    Review,
    /// Referral errors (6xxx)
    Referral,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Catalog,
            4000..5000 => Self::Booking,
            5000..6000 => Self::Review,
            6000..7000 => Self::Referral,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Catalog => "catalog",
            Self::Booking => "booking",
            Self::Review => "review",
            Self::Referral => "referral",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3101), ErrorCategory::Catalog);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Booking);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Review);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Referral);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TourNotFound.category(), ErrorCategory::Catalog);
        assert_eq!(ErrorCode::CartEmpty.category(), ErrorCategory::Booking);
        assert_eq!(
            ErrorCode::DiscountOutOfRange.category(),
            ErrorCategory::Referral
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Referral).unwrap();
        assert_eq!(json, "\"referral\"");

        let category: ErrorCategory = serde_json::from_str("\"catalog\"").unwrap();
        assert_eq!(category, ErrorCategory::Catalog);
        assert_eq!(category.name(), "catalog");
    }
}
