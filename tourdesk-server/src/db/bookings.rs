use shared::models::{Booking, BookingCreate, BookingStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::BoxError;

#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub booking_number: String,
    pub tour_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub booking_date: String,
    pub adults: i32,
    pub children: i32,
    pub infants: i32,
    pub total_price: f64,
    pub status: String,
    pub notes: Option<String>,
    pub referral_code: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<BookingRow> for Booking {
    type Error = BoxError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::from_db(&row.status)
            .ok_or_else(|| format!("unknown booking status: {}", row.status))?;
        Ok(Booking {
            id: row.id,
            booking_number: row.booking_number,
            tour_id: row.tour_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            booking_date: row.booking_date,
            adults: row.adults,
            children: row.children,
            infants: row.infants,
            total_price: row.total_price,
            status,
            notes: row.notes,
            referral_code: row.referral_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, BoxError> {
    rows.into_iter().map(Booking::try_from).collect()
}

/// Insert a pending booking under `booking_number`
pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    booking_number: &str,
    data: &BookingCreate,
    now: i64,
) -> Result<Booking, BoxError> {
    let row: BookingRow = sqlx::query_as(
        "INSERT INTO bookings (id, booking_number, tour_id, customer_name, customer_email,
             customer_phone, booking_date, adults, children, infants, total_price, status,
             notes, referral_code, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending', $12, $13, $14, $14)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(booking_number)
    .bind(data.tour_id)
    .bind(data.customer_name.trim())
    .bind(data.customer_email.trim())
    .bind(data.customer_phone.as_deref())
    .bind(&data.booking_date)
    .bind(data.adults)
    .bind(data.children)
    .bind(data.infants)
    .bind(data.total_price)
    .bind(data.notes.as_deref())
    .bind(data.referral_code.as_deref())
    .bind(now)
    .fetch_one(executor)
    .await?;
    row.try_into()
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Booking>, BoxError> {
    let rows: Vec<BookingRow> = sqlx::query_as("SELECT * FROM bookings ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    into_bookings(rows)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Booking>, BoxError> {
    let row: Option<BookingRow> = sqlx::query_as("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Booking::try_from).transpose()
}

pub async fn find_by_number(
    pool: &PgPool,
    booking_number: &str,
) -> Result<Option<Booking>, BoxError> {
    let row: Option<BookingRow> =
        sqlx::query_as("SELECT * FROM bookings WHERE booking_number = $1")
            .bind(booking_number)
            .fetch_optional(pool)
            .await?;
    row.map(Booking::try_from).transpose()
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Vec<Booking>, BoxError> {
    let rows: Vec<BookingRow> = sqlx::query_as(
        "SELECT * FROM bookings WHERE lower(customer_email) = lower($1) ORDER BY created_at DESC",
    )
    .bind(email.trim())
    .fetch_all(pool)
    .await?;
    into_bookings(rows)
}

pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: BookingStatus,
    now: i64,
) -> Result<Option<Booking>, BoxError> {
    let row: Option<BookingRow> = sqlx::query_as(
        "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status.as_db())
    .bind(now)
    .fetch_optional(pool)
    .await?;
    row.map(Booking::try_from).transpose()
}
