//! Referral code utilities
//!
//! Normalisation, generation, affiliate links and the cookie the storefront
//! uses to remember a `?ref=` code between visits.

use rand::Rng;

/// Cookie holding the captured referral code
pub const REFERRAL_COOKIE: &str = "referral_code";
/// Cookie holding the capture time (Unix millis)
pub const REFERRAL_DATE_COOKIE: &str = "referral_code_date";

/// Trim and upper-case; blank means no code
pub fn normalize_code(code: Option<&str>) -> Option<String> {
    let code = code?.trim();
    if code.is_empty() {
        return None;
    }
    Some(code.to_uppercase())
}

/// Code prefix derived from a name: upper-cased, `[A-Z0-9]` only, at most 6 chars
pub fn code_prefix(name: &str) -> String {
    name.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .take(6)
        .collect()
}

/// Generate a referral code: name prefix + 3-digit zero-padded random number
pub fn generate_code(name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("{}{:03}", code_prefix(name), suffix)
}

/// `{base}/?ref={code}`
pub fn referral_link(base_url: &str, code: &str) -> String {
    format!(
        "{}/?ref={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(code)
    )
}

/// `Set-Cookie` values for a captured code
pub fn capture_cookies(code: &str, captured_at: i64, max_age_days: u32) -> [String; 2] {
    let max_age = u64::from(max_age_days) * 24 * 60 * 60;
    [
        format!(
            "{REFERRAL_COOKIE}={}; Path=/; Max-Age={max_age}; SameSite=Lax",
            urlencoding::encode(code)
        ),
        format!("{REFERRAL_DATE_COOKIE}={captured_at}; Path=/; Max-Age={max_age}; SameSite=Lax"),
    ]
}

/// Read a cookie value from a `Cookie` header
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Referral code carried by a `Cookie` header, normalised
pub fn code_from_cookie(header: &str) -> Option<String> {
    let raw = cookie_value(header, REFERRAL_COOKIE)?;
    let decoded = urlencoding::decode(raw).ok()?;
    normalize_code(Some(&decoded))
}

/// Explicit code wins over the captured one
pub fn resolve_code(explicit: Option<&str>, captured: Option<&str>) -> Option<String> {
    normalize_code(explicit).or_else(|| normalize_code(captured))
}
