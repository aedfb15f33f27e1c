//! Shopping cart
//!
//! The storefront keeps the cart client-side; the server receives it as a
//! list of [`CartLine`]s and rebuilds [`CartItem`]s with catalog prices.

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::Tour;
use crate::pricing::{self, TierPrices, Travelers};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound for each traveler tier on one line
pub const MAX_TRAVELERS_PER_TIER: u32 = 99;

/// Cart line as sent by the client (no prices)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub tour_id: Uuid,
    #[serde(default)]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    /// YYYY-MM-DD
    #[serde(default)]
    pub date: String,
}

impl CartLine {
    pub fn travelers(&self) -> Travelers {
        Travelers {
            adults: self.adults,
            children: self.children,
            infants: self.infants,
        }
    }

    /// Each tier within `0..=MAX_TRAVELERS_PER_TIER`
    pub fn check_counts(&self) -> AppResult<()> {
        for (field, count) in [
            ("adults", self.adults),
            ("children", self.children),
            ("infants", self.infants),
        ] {
            if count > MAX_TRAVELERS_PER_TIER {
                return Err(AppError::field(ErrorCode::ValueOutOfRange, field)
                    .with_detail("tour_id", self.tour_id.to_string())
                    .with_detail("max", MAX_TRAVELERS_PER_TIER));
            }
        }
        Ok(())
    }

    /// Counts in range; date present, parseable and not before `today`;
    /// at least one adult or child
    pub fn validate(&self, today: NaiveDate) -> AppResult<NaiveDate> {
        self.check_counts()?;
        let date = validate_date(&self.date, today)?;
        if self.adults == 0 && self.children == 0 {
            return Err(AppError::new(ErrorCode::BookingNoTravelers)
                .with_detail("tour_id", self.tour_id.to_string()));
        }
        Ok(date)
    }
}

fn validate_date(date: &str, today: NaiveDate) -> AppResult<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return Err(AppError::field(ErrorCode::BookingDateRequired, "date"));
    }
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        AppError::with_message(ErrorCode::InvalidFormat, "Date must be YYYY-MM-DD")
            .with_detail("field", "date")
    })?;
    if parsed < today {
        return Err(AppError::field(ErrorCode::BookingDateInPast, "date"));
    }
    Ok(parsed)
}

/// Cart entry with the tour it books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub tour: Tour,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub date: String,
}

impl CartItem {
    pub fn from_line(line: &CartLine, tour: Tour) -> Self {
        Self {
            tour,
            adults: line.adults,
            children: line.children,
            infants: line.infants,
            date: line.date.trim().to_string(),
        }
    }

    pub fn travelers(&self) -> Travelers {
        Travelers {
            adults: self.adults,
            children: self.children,
            infants: self.infants,
        }
    }

    pub fn line_total(&self) -> f64 {
        let prices = TierPrices {
            adult: self.tour.price_adult,
            child: self.tour.price_child,
            infant: self.tour.price_infant,
        };
        pricing::line_total(prices, self.travelers())
    }
}

/// Partial cart entry change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartItemUpdate {
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub infants: Option<u32>,
    pub date: Option<String>,
}

/// Cart: at most one entry per tour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the entry for the same tour, else append
    pub fn add_item(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|i| i.tour.id == item.tour.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove_item(&mut self, tour_id: Uuid) {
        self.items.retain(|i| i.tour.id != tour_id);
    }

    /// Returns false when the tour is not in the cart
    pub fn update_item(&mut self, tour_id: Uuid, update: CartItemUpdate) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.tour.id == tour_id) else {
            return false;
        };
        if let Some(adults) = update.adults {
            item.adults = adults;
        }
        if let Some(children) = update.children {
            item.children = children;
        }
        if let Some(infants) = update.infants {
            item.infants = infants;
        }
        if let Some(date) = update.date {
            item.date = date;
        }
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ (adults + children + infants)
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.travelers().total()))
    }

    /// Σ line totals
    pub fn total_price(&self) -> f64 {
        pricing::sum(self.items.iter().map(CartItem::line_total))
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        let mut cart = Cart::new();
        for item in iter {
            cart.add_item(item);
        }
        cart
    }
}
