pub mod instrument;
pub mod order;
pub mod trade;
pub mod user;

pub use instrument::*;
pub use order::*;
pub use trade::*;
pub use user::*;

use chrono::{DateTime, SecondsFormat, Utc};
use validator::ValidationError;

/// ISO-8601 UTC with millisecond precision and a trailing `Z`,
/// e.g. `2024-05-01T12:30:00.123Z`. All wire timestamps use this form.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Tickers are 2-10 uppercase ASCII letters.
pub fn validate_ticker(ticker: &str) -> Result<(), ValidationError> {
    let ok = (2..=10).contains(&ticker.len()) && ticker.chars().all(|c| c.is_ascii_uppercase());
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("ticker"))
    }
}
