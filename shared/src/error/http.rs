//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::TourNotFound
            | Self::ComboNotFound
            | Self::BookingNotFound
            | Self::ReviewNotFound
            | Self::ReferralNotFound
            | Self::DashboardUserNotFound => StatusCode::NOT_FOUND,

            Self::ReferralCodeExists | Self::DashboardUserEmailExists => StatusCode::CONFLICT,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            Self::AdminRequired => StatusCode::FORBIDDEN,

            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // validation and business rules
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_not_found() {
        assert_eq!(ErrorCode::TourNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DashboardUserNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn duplicates_conflict() {
        assert_eq!(
            ErrorCode::ReferralCodeExists.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::DashboardUserEmailExists.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn session_and_role_statuses() {
        assert_eq!(
            ErrorCode::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::AccountDisabled.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::AdminRequired.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorCode::TooManyAttempts.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn rule_violations_are_bad_requests() {
        for code in [
            ErrorCode::CartEmpty,
            ErrorCode::BookingDateInPast,
            ErrorCode::ValueOutOfRange,
            ErrorCode::BookingInvalidStatus,
            ErrorCode::ReferralInvalidStatus,
            ErrorCode::DiscountOutOfRange,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST, "{code}");
        }
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
