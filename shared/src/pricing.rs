//! Price arithmetic
//!
//! Tiered line totals, referral discounts and affiliate commissions.
//! Uses rust_decimal for precise calculations, stores as f64.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Render an amount the way the storefront prints it: no trailing zeros
/// (`89`, `89.5`, `12.34`)
pub fn format_amount(value: f64) -> String {
    round_money(to_decimal(value)).normalize().to_string()
}

/// Per-traveler prices of one tour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPrices {
    pub adult: f64,
    pub child: f64,
    pub infant: f64,
}

/// Travelers on one cart line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Travelers {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Travelers {
    pub fn total(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }
}

/// price_adult × adults + price_child × children + price_infant × infants
pub fn line_total(prices: TierPrices, travelers: Travelers) -> f64 {
    let total = to_decimal(prices.adult) * Decimal::from(travelers.adults)
        + to_decimal(prices.child) * Decimal::from(travelers.children)
        + to_decimal(prices.infant) * Decimal::from(travelers.infants);
    to_f64(total)
}

/// Sum of line totals
pub fn sum(amounts: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(amounts.into_iter().map(to_decimal).sum())
}

/// Clamp a percentage into 0..=100; NaN becomes 0
pub fn clamp_percentage(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Subtotal, referral discount and payable total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: f64,
    pub discount_percentage: f64,
    pub discount: f64,
    pub total: f64,
}

impl PriceBreakdown {
    /// No discount applied
    pub fn undiscounted(subtotal: f64) -> Self {
        Self::with_discount(subtotal, 0.0)
    }

    /// discount = subtotal × pct / 100 (rounded to cents); total never negative
    pub fn with_discount(subtotal: f64, discount_percentage: f64) -> Self {
        let pct = clamp_percentage(discount_percentage);
        let subtotal_d = round_money(to_decimal(subtotal.max(0.0)));
        let discount_d = round_money(subtotal_d * to_decimal(pct) / Decimal::ONE_HUNDRED);
        let total_d = (subtotal_d - discount_d).max(Decimal::ZERO);
        Self {
            subtotal: to_f64(subtotal_d),
            discount_percentage: pct,
            discount: to_f64(discount_d),
            total: to_f64(total_d),
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discount > 0.0
    }
}

/// commission = total × commission_rate / 100
pub fn commission(total: f64, commission_rate: f64) -> f64 {
    let rate = clamp_percentage(commission_rate);
    to_f64(to_decimal(total) * to_decimal(rate) / Decimal::ONE_HUNDRED)
}

/// Spread a cart-level discount over its lines proportionally.
///
/// Returns each line's discounted total. The last line absorbs rounding so
/// the results always sum to `sum(lines) - discount`.
pub fn distribute_discount(lines: &[f64], discount: f64) -> Vec<f64> {
    let subtotal: Decimal = lines.iter().copied().map(to_decimal).sum();
    let discount = to_decimal(discount).max(Decimal::ZERO).min(subtotal);
    if lines.is_empty() || discount.is_zero() || subtotal.is_zero() {
        return lines.iter().copied().map(|l| to_f64(to_decimal(l))).collect();
    }

    let mut remaining = discount;
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line = to_decimal(*line);
            let share = if i == last {
                remaining
            } else {
                round_money(discount * line / subtotal)
            };
            remaining -= share;
            to_f64((line - share).max(Decimal::ZERO))
        })
        .collect()
}
