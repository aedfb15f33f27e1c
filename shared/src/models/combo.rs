//! Combo Model

use super::tour::Tour;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bundle of tours sold at a discounted price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Combo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(alias = "tourIds")]
    pub tour_ids: Vec<Uuid>,
    #[serde(alias = "originalPrice")]
    pub original_price: f64,
    #[serde(alias = "discountedPrice")]
    pub discounted_price: f64,
    /// Advertised discount percentage (display only)
    pub discount: i32,
    pub image: String,
    pub created_at: i64,
}

/// Combo with its referenced tours resolved, in `tour_ids` order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboWithTours {
    #[serde(flatten)]
    pub combo: Combo,
    pub tours: Vec<Tour>,
}

impl ComboWithTours {
    /// Attach tours; ids with no matching tour are skipped
    pub fn resolve(combo: Combo, catalog: &[Tour]) -> Self {
        let tours = combo
            .tour_ids
            .iter()
            .filter_map(|id| catalog.iter().find(|t| t.id == *id).cloned())
            .collect();
        Self { combo, tours }
    }
}
