use shared::models::Combo;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_all(pool: &PgPool) -> Result<Vec<Combo>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM combos ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Combo>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM combos WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
