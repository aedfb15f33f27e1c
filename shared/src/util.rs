use chrono::{NaiveDate, Utc};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
