//! Cart quotes and checkout
//!
//! Prices always come from the catalog. A referral code that is unknown or
//! inactive is ignored, never an error.

use serde::{Deserialize, Serialize};
use shared::cart::{Cart, CartItem, CartLine};
use shared::checkout::{AppliedReferral, booking_message, whatsapp_url};
use shared::error::{AppError, ErrorCode};
use shared::models::{BookingCreate, CustomerInfo, DashboardUser, Tour, generate_booking_number};
use shared::pricing::{self, PriceBreakdown};
use shared::referral::normalize_code;
use shared::util::{now_millis, today};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{ServiceError, ServiceResult, is_unique_violation};

/// Booking-number collisions retried before giving up
const MAX_CHECKOUT_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<CartLine>,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    #[serde(default)]
    pub items: Vec<CartLine>,
    pub referral_code: Option<String>,
}

/// Priced cart line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteLine {
    pub tour_id: Uuid,
    pub title: String,
    pub image: String,
    pub date: String,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub line_total: f64,
}

impl From<&CartItem> for QuoteLine {
    fn from(item: &CartItem) -> Self {
        Self {
            tour_id: item.tour.id,
            title: item.tour.title.clone(),
            image: item.tour.image.clone(),
            date: item.date.clone(),
            adults: item.adults,
            children: item.children,
            infants: item.infants,
            line_total: item.line_total(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub items: Vec<QuoteLine>,
    pub total_items: u32,
    pub subtotal: f64,
    pub discount_percentage: f64,
    pub discount: f64,
    pub total: f64,
    pub referral: Option<AppliedReferral>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub booking_numbers: Vec<String>,
    pub quote: Quote,
    pub message: String,
    pub whatsapp_url: String,
}

/// Price a cart, applying the referrer's discount when there is one
pub fn price_cart(cart: &Cart, referrer: Option<&DashboardUser>) -> Quote {
    let subtotal = cart.total_price();
    let (breakdown, referral) = match referrer {
        Some(user) => {
            let breakdown = PriceBreakdown::with_discount(subtotal, user.discount_percentage);
            let referral = AppliedReferral {
                code: user.referral_code.clone(),
                discount_percentage: breakdown.discount_percentage,
                discount: breakdown.discount,
            };
            (breakdown, Some(referral))
        }
        None => (PriceBreakdown::undiscounted(subtotal), None),
    };

    Quote {
        items: cart.items().iter().map(QuoteLine::from).collect(),
        total_items: cart.total_items(),
        subtotal: breakdown.subtotal,
        discount_percentage: breakdown.discount_percentage,
        discount: breakdown.discount,
        total: breakdown.total,
        referral,
    }
}

/// Rebuild the cart from client lines with catalog prices
async fn load_cart(pool: &PgPool, lines: &[CartLine]) -> ServiceResult<Cart> {
    if lines.is_empty() {
        return Ok(Cart::new());
    }
    for line in lines {
        line.check_counts()?;
    }
    let ids: Vec<Uuid> = lines.iter().map(|l| l.tour_id).collect();
    let tours = db::tours::find_by_ids(pool, &ids).await?;
    build_cart(lines, &tours)
}

fn build_cart(lines: &[CartLine], tours: &[Tour]) -> ServiceResult<Cart> {
    lines
        .iter()
        .map(|line| -> ServiceResult<CartItem> {
            let tour = tours
                .iter()
                .find(|t| t.id == line.tour_id)
                .cloned()
                .ok_or_else(|| AppError::tour_not_found(line.tour_id))?;
            Ok(CartItem::from_line(line, tour))
        })
        .collect()
}

/// Active affiliate behind `code`, if any
pub async fn find_referrer(pool: &PgPool, code: Option<&str>) -> ServiceResult<Option<DashboardUser>> {
    let Some(code) = normalize_code(code) else {
        return Ok(None);
    };
    let referrer = db::dashboard_users::find_active_by_code(pool, &code).await?;
    if referrer.is_none() {
        tracing::debug!(code = %code, "Referral code ignored: unknown or inactive");
    }
    Ok(referrer)
}

pub async fn quote(pool: &PgPool, request: &QuoteRequest) -> ServiceResult<Quote> {
    let cart = load_cart(pool, &request.items).await?;
    let referrer = find_referrer(pool, request.referral_code.as_deref()).await?;
    Ok(price_cart(&cart, referrer.as_ref()))
}

/// Validate, persist one pending booking per line, and compose the hand-off
pub async fn checkout(
    pool: &PgPool,
    whatsapp_number: &str,
    request: &CheckoutRequest,
) -> ServiceResult<CheckoutReceipt> {
    request.customer.validate()?;
    if request.items.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty).into());
    }
    let today = today();
    for line in &request.items {
        line.validate(today)?;
    }

    let cart = load_cart(pool, &request.items).await?;
    let referrer = find_referrer(pool, request.referral_code.as_deref()).await?;
    let quote = price_cart(&cart, referrer.as_ref());

    let line_totals: Vec<f64> = cart.items().iter().map(CartItem::line_total).collect();
    let booked_totals = pricing::distribute_discount(&line_totals, quote.discount);

    let mut attempt = 1;
    let booking_numbers = loop {
        match persist(pool, &request.customer, &cart, &booked_totals, referrer.as_ref()).await {
            Ok(numbers) => break numbers,
            Err(ServiceError::Db(e))
                if attempt < MAX_CHECKOUT_ATTEMPTS
                    && e.downcast_ref::<sqlx::Error>().is_some_and(is_unique_violation) =>
            {
                tracing::warn!(attempt, "Booking number collision, retrying checkout");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    tracing::info!(
        bookings = booking_numbers.len(),
        total = quote.total,
        referral = quote.referral.as_ref().map(|r| r.code.as_str()),
        "Checkout completed"
    );

    let breakdown = PriceBreakdown {
        subtotal: quote.subtotal,
        discount_percentage: quote.discount_percentage,
        discount: quote.discount,
        total: quote.total,
    };
    let message = booking_message(cart.items(), &breakdown, quote.referral.as_ref());
    let whatsapp_url = whatsapp_url(whatsapp_number, &message);

    Ok(CheckoutReceipt {
        booking_numbers,
        quote,
        message,
        whatsapp_url,
    })
}

fn stored_count(count: u32, field: &str) -> ServiceResult<i32> {
    i32::try_from(count).map_err(|_| AppError::field(ErrorCode::ValueOutOfRange, field).into())
}

/// All bookings and referral rows in one transaction
async fn persist(
    pool: &PgPool,
    customer: &CustomerInfo,
    cart: &Cart,
    booked_totals: &[f64],
    referrer: Option<&DashboardUser>,
) -> ServiceResult<Vec<String>> {
    let now = now_millis();
    let date = today();
    let mut tx = pool.begin().await?;
    let mut numbers = Vec::with_capacity(cart.items().len());

    for (item, total) in cart.items().iter().zip(booked_totals) {
        let data = BookingCreate {
            tour_id: Some(item.tour.id),
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            customer_phone: customer.phone.clone().filter(|p| !p.trim().is_empty()),
            booking_date: item.date.clone(),
            adults: stored_count(item.adults, "adults")?,
            children: stored_count(item.children, "children")?,
            infants: stored_count(item.infants, "infants")?,
            total_price: *total,
            notes: customer.notes.clone().filter(|n| !n.trim().is_empty()),
            referral_code: referrer.map(|u| u.referral_code.clone()),
        };
        let booking =
            db::bookings::create(&mut *tx, &generate_booking_number(date), &data, now).await?;

        if let Some(user) = referrer {
            let amount = pricing::commission(booking.total_price, user.commission_rate);
            db::referrals::create(&mut *tx, user.id, booking.id, &user.referral_code, amount, now)
                .await?;
            db::dashboard_users::increment_referrals(&mut *tx, user.id, now).await?;
        }
        numbers.push(booking.booking_number);
    }

    tx.commit().await?;
    Ok(numbers)
}
