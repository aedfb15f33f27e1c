//! Dashboard User Model
//!
//! Dashboard users are referral affiliates; their referral code doubles as
//! the dashboard login credential.

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dashboard role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardRole {
    Admin,
    Affiliate,
    Manager,
}

impl DashboardRole {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "affiliate" => Some(Self::Affiliate),
            "manager" => Some(Self::Manager),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Affiliate => "affiliate",
            Self::Manager => "manager",
        }
    }

    /// Can manage other dashboard users?
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

/// Dashboard user entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Upper-case, unique
    pub referral_code: String,
    pub referral_link: String,
    /// 0 ..= 100, applied to referred carts
    pub discount_percentage: f64,
    pub user_id: Option<Uuid>,
    pub role: DashboardRole,
    pub total_referrals: i32,
    pub total_earnings: f64,
    /// Percentage of each referred booking paid out as commission
    pub commission_rate: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dashboard user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardUserCreate {
    pub email: String,
    pub name: String,
    /// Generated from the name when blank
    pub referral_code: Option<String>,
    pub discount_percentage: Option<f64>,
    pub user_id: Option<Uuid>,
    pub role: Option<DashboardRole>,
    pub commission_rate: Option<f64>,
}

impl DashboardUserCreate {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::required("name"));
        }
        if self.email.trim().is_empty() {
            return Err(AppError::required("email"));
        }
        validate_percentage(self.discount_percentage)?;
        validate_commission(self.commission_rate)
    }
}

/// Update dashboard user payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardUserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub referral_code: Option<String>,
    pub discount_percentage: Option<f64>,
    pub role: Option<DashboardRole>,
    pub commission_rate: Option<f64>,
    pub is_active: Option<bool>,
}

impl DashboardUserUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::required("name"));
        }
        if self.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(AppError::required("email"));
        }
        if self
            .referral_code
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(AppError::required("referral_code"));
        }
        validate_percentage(self.discount_percentage)?;
        validate_commission(self.commission_rate)
    }
}

/// Counter overwrite (dashboard)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardUserStats {
    pub total_referrals: Option<i32>,
    pub total_earnings: Option<f64>,
}

fn validate_percentage(pct: Option<f64>) -> AppResult<()> {
    match pct {
        Some(p) if !(0.0..=100.0).contains(&p) => Err(AppError::field(
            ErrorCode::DiscountOutOfRange,
            "discount_percentage",
        )),
        _ => Ok(()),
    }
}

fn validate_commission(rate: Option<f64>) -> AppResult<()> {
    match rate {
        Some(r) if !(0.0..=100.0).contains(&r) => Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Commission rate must be between 0 and 100",
        )
        .with_detail("field", "commission_rate")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> DashboardUserCreate {
        DashboardUserCreate {
            email: "maria@example.com".into(),
            name: "María".into(),
            referral_code: None,
            discount_percentage: Some(10.0),
            user_id: None,
            role: None,
            commission_rate: None,
        }
    }

    #[test]
    fn role_db_and_permissions() {
        for role in [
            DashboardRole::Admin,
            DashboardRole::Affiliate,
            DashboardRole::Manager,
        ] {
            assert_eq!(DashboardRole::from_db(role.as_db()), Some(role));
        }
        assert!(DashboardRole::Admin.can_manage_users());
        assert!(DashboardRole::Manager.can_manage_users());
        assert!(!DashboardRole::Affiliate.can_manage_users());
    }

    #[test]
    fn create_requires_name_and_email() {
        assert!(create().validate().is_ok());
        let mut c = create();
        c.email = " ".into();
        assert_eq!(c.validate().unwrap_err().code, ErrorCode::RequiredField);
    }

    #[test]
    fn discount_must_be_a_percentage() {
        let mut c = create();
        c.discount_percentage = Some(100.0);
        assert!(c.validate().is_ok());
        c.discount_percentage = Some(100.5);
        assert_eq!(c.validate().unwrap_err().code, ErrorCode::DiscountOutOfRange);

        let update = DashboardUserUpdate {
            discount_percentage: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(
            update.validate().unwrap_err().code,
            ErrorCode::DiscountOutOfRange
        );
    }

    #[test]
    fn blank_code_update_rejected() {
        let update = DashboardUserUpdate {
            referral_code: Some("".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
