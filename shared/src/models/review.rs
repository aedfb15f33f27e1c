//! Review Model

use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Customer review; only verified reviews are shown publicly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: Uuid,
    pub tour_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    /// 1 ..= 5
    pub rating: i32,
    pub comment: String,
    pub verified: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public review submission. Always stored unverified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub tour_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub rating: i32,
    pub comment: String,
}

impl ReviewCreate {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::required("name"));
        }
        if self.comment.trim().is_empty() {
            return Err(AppError::required("comment"));
        }
        validate_rating(self.rating)
    }
}

/// Update review payload (dashboard)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub verified: Option<bool>,
}

impl ReviewUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::required("name"));
        }
        if self.comment.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::required("comment"));
        }
        match self.rating {
            Some(r) => validate_rating(r),
            None => Ok(()),
        }
    }
}

fn validate_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::field(ErrorCode::ReviewInvalidRating, "rating"));
    }
    Ok(())
}

/// Dashboard moderation view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewBuckets {
    pub pending: Vec<Review>,
    pub verified: Vec<Review>,
    pub pending_count: usize,
    pub verified_count: usize,
}

impl ReviewBuckets {
    /// Split reviews by verification state, keeping their order
    pub fn split(reviews: Vec<Review>) -> Self {
        let (verified, pending): (Vec<_>, Vec<_>) =
            reviews.into_iter().partition(|r| r.verified);
        Self {
            pending_count: pending.len(),
            verified_count: verified.len(),
            pending,
            verified,
        }
    }
}
