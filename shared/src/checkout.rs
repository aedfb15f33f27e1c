//! WhatsApp hand-off
//!
//! Checkout does not take payment; it composes a booking request message and
//! a `wa.me` link the customer opens to send it.

use crate::cart::CartItem;
use crate::pricing::{PriceBreakdown, format_amount};
use serde::{Deserialize, Serialize};

const WHATSAPP_BASE: &str = "https://wa.me";
const BOOKING_GREETING: &str = "Hola! Me gustaría reservar los siguientes tours:";
const INQUIRY_GREETING: &str = "Hola, estoy interesado en el tour:";

/// Referral applied to a checkout message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedReferral {
    pub code: String,
    pub discount_percentage: f64,
    pub discount: f64,
}

fn item_block(item: &CartItem) -> String {
    format!(
        "*{}*\nFecha: {}\nAdultos: {}, Niños: {}, Infantes: {}\nSubtotal: ${}",
        item.tour.title,
        item.date,
        item.adults,
        item.children,
        item.infants,
        format_amount(item.line_total()),
    )
}

/// Compose the booking request message
pub fn booking_message(
    items: &[CartItem],
    breakdown: &PriceBreakdown,
    referral: Option<&AppliedReferral>,
) -> String {
    let body = items.iter().map(item_block).collect::<Vec<_>>().join("\n\n");
    let mut message = format!("{BOOKING_GREETING}\n\n{body}");
    if let Some(referral) = referral.filter(|r| r.discount > 0.0) {
        message.push_str(&format!(
            "\n\nCódigo de referido: {}\nDescuento ({}%): -${}",
            referral.code,
            format_amount(referral.discount_percentage),
            format_amount(referral.discount),
        ));
    }
    message.push_str(&format!("\n\n*Total: ${}*", format_amount(breakdown.total)));
    message
}

/// Single-tour inquiry message
pub fn inquiry_message(tour_title: &str) -> String {
    format!("{INQUIRY_GREETING} {tour_title}")
}

/// `https://wa.me/{number}?text={percent-encoded message}`
pub fn whatsapp_url(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!(
        "{WHATSAPP_BASE}/{digits}?text={}",
        urlencoding::encode(message)
    )
}
