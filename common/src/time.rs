use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

/// Round a millisecond span up to whole seconds. Negative spans are zero.
pub fn ceil_secs(millis: i64) -> u64 {
    if millis <= 0 {
        0
    } else {
        (millis as u64).div_ceil(1000)
    }
}

/// Format a timestamp as `M/D HH:MM` in the given zone, the way posts and
/// comments are labelled on the board.
pub fn format_timestamp<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%-m/%-d %H:%M").to_string()
}
