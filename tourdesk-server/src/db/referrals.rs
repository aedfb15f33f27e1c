use shared::models::{Referral, ReferralStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::dashboard_users;
use crate::error::BoxError;

#[derive(sqlx::FromRow)]
pub struct ReferralRow {
    pub id: Uuid,
    pub dashboard_user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub referral_code: String,
    pub commission_amount: f64,
    pub status: String,
    pub created_at: i64,
    pub paid_at: Option<i64>,
}

impl TryFrom<ReferralRow> for Referral {
    type Error = BoxError;

    fn try_from(row: ReferralRow) -> Result<Self, Self::Error> {
        let status = ReferralStatus::from_db(&row.status)
            .ok_or_else(|| format!("unknown referral status: {}", row.status))?;
        Ok(Referral {
            id: row.id,
            dashboard_user_id: row.dashboard_user_id,
            booking_id: row.booking_id,
            referral_code: row.referral_code,
            commission_amount: row.commission_amount,
            status,
            created_at: row.created_at,
            paid_at: row.paid_at,
        })
    }
}

fn into_referrals(rows: Vec<ReferralRow>) -> Result<Vec<Referral>, BoxError> {
    rows.into_iter().map(Referral::try_from).collect()
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    dashboard_user_id: Uuid,
    booking_id: Uuid,
    referral_code: &str,
    commission_amount: f64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO referrals (id, dashboard_user_id, booking_id, referral_code,
             commission_amount, status, created_at)
         VALUES ($1, $2, $3, $4, $5, 'pending', $6)",
    )
    .bind(Uuid::new_v4())
    .bind(dashboard_user_id)
    .bind(booking_id)
    .bind(referral_code)
    .bind(commission_amount)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Referral>, BoxError> {
    let rows: Vec<ReferralRow> = sqlx::query_as("SELECT * FROM referrals ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    into_referrals(rows)
}

pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Referral>, BoxError> {
    let rows: Vec<ReferralRow> = sqlx::query_as(
        "SELECT * FROM referrals WHERE dashboard_user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    into_referrals(rows)
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Vec<Referral>, BoxError> {
    let rows: Vec<ReferralRow> = sqlx::query_as(
        "SELECT * FROM referrals WHERE referral_code = $1 ORDER BY created_at DESC",
    )
    .bind(code)
    .fetch_all(pool)
    .await?;
    into_referrals(rows)
}

/// Effect of a status change on `paid_at` and the affiliate's earnings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    paid_at: Option<i64>,
    credit: bool,
}

/// `paid_at` is set on the first move to `paid` and kept afterwards, so a
/// referral that leaves `paid` and comes back is not credited again
fn transition(current: &Referral, next: ReferralStatus, now: i64) -> Transition {
    let first_payment = next == ReferralStatus::Paid && current.paid_at.is_none();
    Transition {
        paid_at: if first_payment { Some(now) } else { current.paid_at },
        credit: first_payment,
    }
}

/// Change status. The first move to `paid` stamps `paid_at` and credits the
/// commission to the affiliate.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: ReferralStatus,
    now: i64,
) -> Result<Option<Referral>, BoxError> {
    let mut tx = pool.begin().await?;

    let current: Option<ReferralRow> =
        sqlx::query_as("SELECT * FROM referrals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(current) = current else {
        return Ok(None);
    };
    let current = Referral::try_from(current)?;

    let Transition { paid_at, credit } = transition(&current, status, now);

    let row: ReferralRow = sqlx::query_as(
        "UPDATE referrals SET status = $2, paid_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status.as_db())
    .bind(paid_at)
    .fetch_one(&mut *tx)
    .await?;

    if credit {
        dashboard_users::add_earnings(
            &mut *tx,
            current.dashboard_user_id,
            current.commission_amount,
            now,
        )
        .await?;
        tracing::info!(
            referral_id = %id,
            dashboard_user_id = %current.dashboard_user_id,
            amount = current.commission_amount,
            "Referral commission paid"
        );
    }

    tx.commit().await?;
    Ok(Some(row.try_into()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_status_parsed() {
        let row = ReferralRow {
            id: Uuid::new_v4(),
            dashboard_user_id: Uuid::new_v4(),
            booking_id: None,
            referral_code: "ANA007".into(),
            commission_amount: 17.8,
            status: "paid".into(),
            created_at: 1,
            paid_at: Some(2),
        };
        let referral = Referral::try_from(row).unwrap();
        assert_eq!(referral.status, ReferralStatus::Paid);
        assert_eq!(referral.paid_at, Some(2));
    }

    fn pending() -> Referral {
        Referral {
            id: Uuid::new_v4(),
            dashboard_user_id: Uuid::new_v4(),
            booking_id: Some(Uuid::new_v4()),
            referral_code: "ANA007".into(),
            commission_amount: 17.8,
            status: ReferralStatus::Pending,
            created_at: 1,
            paid_at: None,
        }
    }

    fn apply(referral: &mut Referral, status: ReferralStatus, now: i64) -> bool {
        let t = transition(referral, status, now);
        referral.status = status;
        referral.paid_at = t.paid_at;
        t.credit
    }

    #[test]
    fn first_payment_credits() {
        let mut referral = pending();
        assert!(apply(&mut referral, ReferralStatus::Paid, 10));
        assert_eq!(referral.paid_at, Some(10));
        assert!(!apply(&mut referral, ReferralStatus::Paid, 20));
        assert_eq!(referral.paid_at, Some(10));
    }

    #[test]
    fn repaying_after_reopen_credits_nothing() {
        let mut referral = pending();
        assert!(apply(&mut referral, ReferralStatus::Paid, 10));
        assert!(!apply(&mut referral, ReferralStatus::Pending, 20));
        assert_eq!(referral.paid_at, Some(10));
        assert!(!apply(&mut referral, ReferralStatus::Paid, 30));
        assert!(!apply(&mut referral, ReferralStatus::Cancelled, 40));
        assert!(!apply(&mut referral, ReferralStatus::Paid, 50));
        assert_eq!(referral.paid_at, Some(10));
    }

    #[test]
    fn non_payment_moves_credit_nothing() {
        let mut referral = pending();
        assert!(!apply(&mut referral, ReferralStatus::Cancelled, 10));
        assert_eq!(referral.paid_at, None);
        assert!(apply(&mut referral, ReferralStatus::Paid, 20));
    }
}
