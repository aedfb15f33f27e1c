//! Referral Model

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Commission payout state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Paid,
    Cancelled,
}

impl ReferralStatus {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Booking attributed to an affiliate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub dashboard_user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub referral_code: String,
    pub commission_amount: f64,
    pub status: ReferralStatus,
    pub created_at: i64,
    pub paid_at: Option<i64>,
}

/// Status change (dashboard)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralStatusUpdate {
    pub status: String,
}

impl ReferralStatusUpdate {
    pub fn status(&self) -> AppResult<ReferralStatus> {
        let raw = self.status.trim();
        ReferralStatus::from_db(&raw.to_ascii_lowercase()).ok_or_else(|| {
            AppError::field(ErrorCode::ReferralInvalidStatus, "status").with_detail("value", raw)
        })
    }
}

/// Public view of a referral code: enough for the storefront banner,
/// nothing about the affiliate's earnings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralInfo {
    pub referral_code: String,
    pub name: String,
    pub discount_percentage: f64,
}
