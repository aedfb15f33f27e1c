use shared::models::{DashboardRole, DashboardUser, DashboardUserStats, DashboardUserUpdate};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::BoxError;

#[derive(sqlx::FromRow)]
pub struct DashboardUserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub referral_code: String,
    pub referral_link: String,
    pub discount_percentage: f64,
    pub user_id: Option<Uuid>,
    pub role: String,
    pub total_referrals: i32,
    pub total_earnings: f64,
    pub commission_rate: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<DashboardUserRow> for DashboardUser {
    type Error = BoxError;

    fn try_from(row: DashboardUserRow) -> Result<Self, Self::Error> {
        let role = DashboardRole::from_db(&row.role)
            .ok_or_else(|| format!("unknown dashboard role: {}", row.role))?;
        Ok(DashboardUser {
            id: row.id,
            email: row.email,
            name: row.name,
            referral_code: row.referral_code,
            referral_link: row.referral_link,
            discount_percentage: row.discount_percentage,
            user_id: row.user_id,
            role,
            total_referrals: row.total_referrals,
            total_earnings: row.total_earnings,
            commission_rate: row.commission_rate,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_users(rows: Vec<DashboardUserRow>) -> Result<Vec<DashboardUser>, BoxError> {
    rows.into_iter().map(DashboardUser::try_from).collect()
}

/// Fully resolved insert: code normalised, link built, defaults applied
pub struct NewDashboardUser {
    pub email: String,
    pub name: String,
    pub referral_code: String,
    pub referral_link: String,
    pub discount_percentage: f64,
    pub user_id: Option<Uuid>,
    pub role: DashboardRole,
    pub commission_rate: f64,
}

/// Insert a user. Unique violations (email, code) surface as `sqlx::Error`.
pub async fn create(
    pool: &PgPool,
    data: &NewDashboardUser,
    now: i64,
) -> Result<DashboardUserRow, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO dashboard_users (id, email, name, referral_code, referral_link,
             discount_percentage, user_id, role, commission_rate, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&data.email)
    .bind(&data.name)
    .bind(&data.referral_code)
    .bind(&data.referral_link)
    .bind(data.discount_percentage)
    .bind(data.user_id)
    .bind(data.role.as_db())
    .bind(data.commission_rate)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_all_active(pool: &PgPool) -> Result<Vec<DashboardUser>, BoxError> {
    let rows: Vec<DashboardUserRow> = sqlx::query_as(
        "SELECT * FROM dashboard_users WHERE is_active ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    into_users(rows)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<DashboardUser>, BoxError> {
    let row: Option<DashboardUserRow> =
        sqlx::query_as("SELECT * FROM dashboard_users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    row.map(DashboardUser::try_from).transpose()
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<DashboardUser>, BoxError> {
    let row: Option<DashboardUserRow> =
        sqlx::query_as("SELECT * FROM dashboard_users WHERE lower(email) = lower($1)")
            .bind(email.trim())
            .fetch_optional(pool)
            .await?;
    row.map(DashboardUser::try_from).transpose()
}

/// Active user owning `code` (already normalised)
pub async fn find_active_by_code<'e>(
    executor: impl PgExecutor<'e>,
    code: &str,
) -> Result<Option<DashboardUser>, BoxError> {
    let row: Option<DashboardUserRow> = sqlx::query_as(
        "SELECT * FROM dashboard_users WHERE referral_code = $1 AND is_active",
    )
    .bind(code)
    .fetch_optional(executor)
    .await?;
    row.map(DashboardUser::try_from).transpose()
}

/// Partial update. `referral_link` is passed when the code changed.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    data: &DashboardUserUpdate,
    referral_link: Option<&str>,
    now: i64,
) -> Result<Option<DashboardUserRow>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE dashboard_users SET
             email = COALESCE($2, email),
             name = COALESCE($3, name),
             referral_code = COALESCE($4, referral_code),
             referral_link = COALESCE($5, referral_link),
             discount_percentage = COALESCE($6, discount_percentage),
             role = COALESCE($7, role),
             commission_rate = COALESCE($8, commission_rate),
             is_active = COALESCE($9, is_active),
             updated_at = $10
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(data.email.as_deref().map(str::trim))
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.referral_code.as_deref())
    .bind(referral_link)
    .bind(data.discount_percentage)
    .bind(data.role.map(|r| r.as_db()))
    .bind(data.commission_rate)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Soft delete
pub async fn deactivate(pool: &PgPool, id: Uuid, now: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE dashboard_users SET is_active = FALSE, updated_at = $2 WHERE id = $1",
    )
    .bind(id)
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

pub async fn update_stats(
    pool: &PgPool,
    id: Uuid,
    stats: &DashboardUserStats,
    now: i64,
) -> Result<Option<DashboardUser>, BoxError> {
    let row: Option<DashboardUserRow> = sqlx::query_as(
        "UPDATE dashboard_users SET
             total_referrals = COALESCE($2, total_referrals),
             total_earnings = COALESCE($3, total_earnings),
             updated_at = $4
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(stats.total_referrals)
    .bind(stats.total_earnings)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    row.map(DashboardUser::try_from).transpose()
}

pub async fn increment_referrals<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE dashboard_users SET total_referrals = total_referrals + 1, updated_at = $2
         WHERE id = $1",
    )
    .bind(id)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Add a paid commission to the affiliate's earnings
pub async fn add_earnings<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    amount: f64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE dashboard_users SET total_earnings = total_earnings + $2, updated_at = $3
         WHERE id = $1",
    )
    .bind(id)
    .bind(amount)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> DashboardUserRow {
        DashboardUserRow {
            id: Uuid::new_v4(),
            email: "juan@example.com".into(),
            name: "Juan".into(),
            referral_code: "JUAN042".into(),
            referral_link: "http://localhost:5173/?ref=JUAN042".into(),
            discount_percentage: 5.0,
            user_id: None,
            role: role.into(),
            total_referrals: 3,
            total_earnings: 42.5,
            commission_rate: 10.0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn row_role_parsed() {
        let user = DashboardUser::try_from(row("manager")).unwrap();
        assert_eq!(user.role, DashboardRole::Manager);
        assert_eq!(user.total_earnings, 42.5);
        assert!(DashboardUser::try_from(row("root")).is_err());
    }
}
