//! PostgreSQL access, one module per table

pub mod bookings;
pub mod combos;
pub mod dashboard_users;
pub mod referrals;
pub mod reviews;
pub mod tours;
