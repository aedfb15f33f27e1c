use shared::models::{Review, ReviewCreate, ReviewUpdate};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_all(pool: &PgPool) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reviews ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_tour(pool: &PgPool, tour_id: Uuid) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reviews WHERE tour_id = $1 ORDER BY created_at DESC")
        .bind(tour_id)
        .fetch_all(pool)
        .await
}

pub async fn find_verified(pool: &PgPool) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM reviews WHERE verified ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

/// Public submission, always unverified
pub async fn create(pool: &PgPool, data: ReviewCreate, now: i64) -> Result<Review, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO reviews (id, tour_id, name, email, rating, comment, verified, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $7)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(data.tour_id)
    .bind(data.name.trim())
    .bind(data.email.as_deref().map(str::trim).filter(|e| !e.is_empty()))
    .bind(data.rating)
    .bind(data.comment.trim())
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    data: ReviewUpdate,
    now: i64,
) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE reviews SET
             name = COALESCE($2, name),
             email = COALESCE($3, email),
             rating = COALESCE($4, rating),
             comment = COALESCE($5, comment),
             verified = COALESCE($6, verified),
             updated_at = $7
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(data.name)
    .bind(data.email)
    .bind(data.rating)
    .bind(data.comment)
    .bind(data.verified)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Approve (`true`) or reject (`false`)
pub async fn set_verified(
    pool: &PgPool,
    id: Uuid,
    verified: bool,
    now: i64,
) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as("UPDATE reviews SET verified = $2, updated_at = $3 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(verified)
        .bind(now)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}
