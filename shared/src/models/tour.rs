//! Tour Model

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Pseudo-category meaning "every tour"
pub const CATEGORY_ALL: &str = "Todos";

/// Storefront category filter, in display order
pub const CATEGORIES: [&str; 7] = [
    CATEGORY_ALL,
    "Acuático",
    "Crucero",
    "Cultural",
    "Aventura",
    "Familia",
    "Romántico",
];

/// Tour entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    /// Free text, e.g. "4 horas"
    pub duration: String,
    pub price_adult: f64,
    pub price_child: f64,
    pub price_infant: f64,
    pub featured: bool,
    pub includes: Vec<String>,
    /// 0.0 ..= 5.0
    pub rating: f64,
    /// Review count shown on the card
    pub reviews: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// `includes` as accepted from the dashboard form: a list, or one
/// comma-separated string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludesInput {
    List(Vec<String>),
    Text(String),
}

impl IncludesInput {
    pub fn into_list(self) -> Vec<String> {
        let items: Vec<String> = match self {
            Self::List(items) => items,
            Self::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Decode a stored `includes` value.
///
/// Accepts a JSON array, or a string holding a JSON array. Anything else
/// (null, malformed text, other scalars) is an empty list.
pub fn decode_includes(value: Option<&Value>) -> Vec<String> {
    fn strings(items: &[Value]) -> Vec<String> {
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    match value {
        Some(Value::Array(items)) => strings(items),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => strings(&items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Create tour payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub duration: String,
    pub price_adult: f64,
    #[serde(default)]
    pub price_child: f64,
    #[serde(default)]
    pub price_infant: f64,
    #[serde(default)]
    pub featured: bool,
    pub includes: Option<IncludesInput>,
    pub rating: Option<f64>,
    pub reviews: Option<i32>,
}

impl TourCreate {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::required("title"));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::required("category"));
        }
        validate_prices([
            Some(self.price_adult),
            Some(self.price_child),
            Some(self.price_infant),
        ])?;
        validate_rating(self.rating)
    }
}

/// Update tour payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub price_adult: Option<f64>,
    pub price_child: Option<f64>,
    pub price_infant: Option<f64>,
    pub featured: Option<bool>,
    pub includes: Option<IncludesInput>,
    pub rating: Option<f64>,
    pub reviews: Option<i32>,
}

impl TourUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::required("title"));
        }
        if self.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::required("category"));
        }
        validate_prices([self.price_adult, self.price_child, self.price_infant])?;
        validate_rating(self.rating)
    }
}

fn validate_prices(prices: [Option<f64>; 3]) -> AppResult<()> {
    if prices
        .into_iter()
        .flatten()
        .any(|p| !p.is_finite() || p < 0.0)
    {
        return Err(AppError::new(ErrorCode::TourInvalidPrice));
    }
    Ok(())
}

fn validate_rating(rating: Option<f64>) -> AppResult<()> {
    match rating {
        Some(r) if !(0.0..=5.0).contains(&r) => {
            Err(AppError::field(ErrorCode::TourInvalidRating, "rating"))
        }
        _ => Ok(()),
    }
}

/// Resolve a category filter: `None` for the "all" pseudo-category
pub fn category_filter(category: Option<&str>) -> Option<&str> {
    match category.map(str::trim) {
        None | Some("") => None,
        Some(c) if c == CATEGORY_ALL => None,
        Some(c) => Some(c),
    }
}
