pub mod dashboard_auth;
pub mod rate_limit;
pub mod referral_capture;

pub use dashboard_auth::{DashboardIdentity, dashboard_auth_middleware, require_user_manager};
pub use rate_limit::login_rate_limit;
pub use referral_capture::{ReferralCookie, capture_referral};
