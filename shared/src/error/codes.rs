//! Numeric error codes shared with the storefront
//!
//! The thousands digit names the domain: 0 general, 1 auth, 2 permission,
//! 3 catalog, 4 booking and cart, 5 reviews, 6 referrals and affiliates,
//! 9 system.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    /// Email or date that does not parse
    InvalidFormat = 6,
    RequiredField = 7,
    /// Counts, stats or rates outside their allowed range
    ValueOutOfRange = 8,

    /// No dashboard session
    NotAuthenticated = 1001,
    /// Referral code does not grant dashboard access
    InvalidCredentials = 1002,
    TokenExpired = 1003,
    TokenInvalid = 1004,
    AccountDisabled = 1007,
    TooManyAttempts = 1008,

    /// Admin or manager role required
    AdminRequired = 2003,

    TourNotFound = 3001,
    TourInvalidPrice = 3002,
    TourInvalidRating = 3003,
    ComboNotFound = 3101,

    BookingNotFound = 4001,
    CartEmpty = 4002,
    BookingDateRequired = 4003,
    BookingDateInPast = 4004,
    /// Neither adults nor children on a cart line
    BookingNoTravelers = 4005,
    BookingInvalidStatus = 4006,

    ReviewNotFound = 5001,
    ReviewInvalidRating = 5002,

    ReferralCodeInvalid = 6001,
    ReferralNotFound = 6002,
    ReferralCodeExists = 6003,
    ReferralInvalidStatus = 6004,
    DashboardUserNotFound = 6101,
    DashboardUserEmailExists = 6102,
    DiscountOutOfRange = 6103,

    InternalError = 9001,
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Every code, in numeric order
    pub const ALL: &'static [ErrorCode] = &[
        Self::Success,
        Self::InvalidFormat,
        Self::RequiredField,
        Self::ValueOutOfRange,
        Self::NotAuthenticated,
        Self::InvalidCredentials,
        Self::TokenExpired,
        Self::TokenInvalid,
        Self::AccountDisabled,
        Self::TooManyAttempts,
        Self::AdminRequired,
        Self::TourNotFound,
        Self::TourInvalidPrice,
        Self::TourInvalidRating,
        Self::ComboNotFound,
        Self::BookingNotFound,
        Self::CartEmpty,
        Self::BookingDateRequired,
        Self::BookingDateInPast,
        Self::BookingNoTravelers,
        Self::BookingInvalidStatus,
        Self::ReviewNotFound,
        Self::ReviewInvalidRating,
        Self::ReferralCodeInvalid,
        Self::ReferralNotFound,
        Self::ReferralCodeExists,
        Self::ReferralInvalidStatus,
        Self::DashboardUserNotFound,
        Self::DashboardUserEmailExists,
        Self::DiscountOutOfRange,
        Self::InternalError,
        Self::DatabaseError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default message sent with the code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",

            Self::NotAuthenticated => "Authentication required",
            Self::InvalidCredentials => "Invalid or inactive referral code",
            Self::TokenExpired => "Session has expired",
            Self::TokenInvalid => "Invalid session token",
            Self::AccountDisabled => "Account is disabled",
            Self::TooManyAttempts => "Too many requests, try again later",

            Self::AdminRequired => "Admin or manager role required",

            Self::TourNotFound => "Tour not found",
            Self::TourInvalidPrice => "Tour prices must not be negative",
            Self::TourInvalidRating => "Tour rating must be between 0 and 5",
            Self::ComboNotFound => "Combo not found",

            Self::BookingNotFound => "Booking not found",
            Self::CartEmpty => "Cart is empty",
            Self::BookingDateRequired => "Please select a date",
            Self::BookingDateInPast => "Booking date must not be in the past",
            Self::BookingNoTravelers => "At least one adult or child is required",
            Self::BookingInvalidStatus => "Unknown booking status",

            Self::ReviewNotFound => "Review not found",
            Self::ReviewInvalidRating => "Review rating must be between 1 and 5",

            Self::ReferralCodeInvalid => "Referral code is invalid or inactive",
            Self::ReferralNotFound => "Referral not found",
            Self::ReferralCodeExists => "Referral code already exists",
            Self::ReferralInvalidStatus => "Unknown referral status",
            Self::DashboardUserNotFound => "Dashboard user not found",
            Self::DashboardUserEmailExists => "Email already registered",
            Self::DiscountOutOfRange => "Discount percentage must be between 0 and 100",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_stable() {
        assert_eq!(ErrorCode::ValueOutOfRange.code(), 8);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::ComboNotFound.code(), 3101);
        assert_eq!(ErrorCode::CartEmpty.code(), 4002);
        assert_eq!(ErrorCode::BookingInvalidStatus.code(), 4006);
        assert_eq!(ErrorCode::ReferralInvalidStatus.code(), 6004);
        assert_eq!(ErrorCode::DashboardUserNotFound.code(), 6101);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn all_is_sorted_and_complete() {
        assert!(ErrorCode::ALL.windows(2).all(|w| w[0].code() < w[1].code()));
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
            assert!(!code.message().is_empty());
        }
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::CartEmpty.is_success());
    }

    #[test]
    fn unknown_numbers_rejected() {
        assert_eq!(ErrorCode::try_from(3), Err(InvalidErrorCode(3)));
        assert_eq!(ErrorCode::try_from(7001), Err(InvalidErrorCode(7001)));
        assert!(serde_json::from_str::<ErrorCode>("10000").is_err());
        assert_eq!(
            format!("{}", InvalidErrorCode(42)),
            "invalid error code: 42"
        );
    }

    #[test]
    fn serialized_as_number() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::BookingNotFound).unwrap(),
            "4001"
        );
        assert_eq!(format!("{}", ErrorCode::TourNotFound), "3001");
    }
}
