use serde_json::Value;
use shared::models::{Tour, TourCreate, TourUpdate, decode_includes};
use sqlx::PgPool;
use uuid::Uuid;

/// Tour row as stored: `includes` is JSONB and legacy rows may lack a rating
#[derive(sqlx::FromRow)]
pub struct TourRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub duration: String,
    pub price_adult: f64,
    pub price_child: f64,
    pub price_infant: f64,
    pub featured: bool,
    pub includes: Option<Value>,
    pub rating: Option<f64>,
    pub reviews: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            image: row.image,
            duration: row.duration,
            price_adult: row.price_adult,
            price_child: row.price_child,
            price_infant: row.price_infant,
            featured: row.featured,
            includes: decode_includes(row.includes.as_ref()),
            rating: row.rating.unwrap_or(0.0),
            reviews: row.reviews.unwrap_or(0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn into_tours(rows: Vec<TourRow>) -> Vec<Tour> {
    rows.into_iter().map(Tour::from).collect()
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Tour>, sqlx::Error> {
    let rows: Vec<TourRow> = sqlx::query_as("SELECT * FROM tours ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(into_tours(rows))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Tour>, sqlx::Error> {
    let row: Option<TourRow> = sqlx::query_as("SELECT * FROM tours WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Tour::from))
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Tour>, sqlx::Error> {
    let rows: Vec<TourRow> = sqlx::query_as("SELECT * FROM tours WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(into_tours(rows))
}

pub async fn find_by_category(pool: &PgPool, category: &str) -> Result<Vec<Tour>, sqlx::Error> {
    let rows: Vec<TourRow> =
        sqlx::query_as("SELECT * FROM tours WHERE category = $1 ORDER BY created_at DESC")
            .bind(category)
            .fetch_all(pool)
            .await?;
    Ok(into_tours(rows))
}

pub async fn find_featured(pool: &PgPool) -> Result<Vec<Tour>, sqlx::Error> {
    let rows: Vec<TourRow> =
        sqlx::query_as("SELECT * FROM tours WHERE featured ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;
    Ok(into_tours(rows))
}

pub async fn create(pool: &PgPool, data: TourCreate, now: i64) -> Result<Tour, sqlx::Error> {
    let includes = data.includes.map(|i| i.into_list()).unwrap_or_default();
    let row: TourRow = sqlx::query_as(
        "INSERT INTO tours (id, title, description, category, image, duration,
             price_adult, price_child, price_infant, featured, includes, rating, reviews,
             created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(data.title.trim())
    .bind(&data.description)
    .bind(data.category.trim())
    .bind(&data.image)
    .bind(&data.duration)
    .bind(data.price_adult)
    .bind(data.price_child)
    .bind(data.price_infant)
    .bind(data.featured)
    .bind(Value::from(includes))
    .bind(data.rating.unwrap_or(0.0))
    .bind(data.reviews.unwrap_or(0))
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Partial update; returns `None` when the tour does not exist
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    data: TourUpdate,
    now: i64,
) -> Result<Option<Tour>, sqlx::Error> {
    let includes = data.includes.map(|i| Value::from(i.into_list()));
    let row: Option<TourRow> = sqlx::query_as(
        "UPDATE tours SET
             title = COALESCE($2, title),
             description = COALESCE($3, description),
             category = COALESCE($4, category),
             image = COALESCE($5, image),
             duration = COALESCE($6, duration),
             price_adult = COALESCE($7, price_adult),
             price_child = COALESCE($8, price_child),
             price_infant = COALESCE($9, price_infant),
             featured = COALESCE($10, featured),
             includes = COALESCE($11, includes),
             rating = COALESCE($12, rating),
             reviews = COALESCE($13, reviews),
             updated_at = $14
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(data.title.as_deref().map(str::trim))
    .bind(data.description)
    .bind(data.category.as_deref().map(str::trim))
    .bind(data.image)
    .bind(data.duration)
    .bind(data.price_adult)
    .bind(data.price_child)
    .bind(data.price_infant)
    .bind(data.featured)
    .bind(includes)
    .bind(data.rating)
    .bind(data.reviews)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Tour::from))
}

pub async fn toggle_featured(
    pool: &PgPool,
    id: Uuid,
    now: i64,
) -> Result<Option<Tour>, sqlx::Error> {
    let row: Option<TourRow> = sqlx::query_as(
        "UPDATE tours SET featured = NOT featured, updated_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Tour::from))
}

/// Returns `false` when nothing was deleted
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM tours WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(includes: Option<Value>) -> TourRow {
        TourRow {
            id: Uuid::new_v4(),
            title: "Crucero al Atardecer".into(),
            description: String::new(),
            category: "Crucero".into(),
            image: String::new(),
            duration: "3 horas".into(),
            price_adult: 89.0,
            price_child: 59.0,
            price_infant: 0.0,
            featured: true,
            includes,
            rating: None,
            reviews: None,
            created_at: 1,
            updated_at: 2,
        }
    }

    #[test]
    fn row_defaults_missing_rating() {
        let tour = Tour::from(row(None));
        assert_eq!(tour.rating, 0.0);
        assert_eq!(tour.reviews, 0);
        assert!(tour.includes.is_empty());
    }

    #[test]
    fn row_decodes_includes_array_and_legacy_string() {
        let tour = Tour::from(row(Some(json!(["Cena", "Bebidas"]))));
        assert_eq!(tour.includes, vec!["Cena", "Bebidas"]);

        let tour = Tour::from(row(Some(json!("[\"Guía\"]"))));
        assert_eq!(tour.includes, vec!["Guía"]);

        let tour = Tour::from(row(Some(json!("not json"))));
        assert!(tour.includes.is_empty());
    }
}
