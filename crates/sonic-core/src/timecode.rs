//! `HH:MM:SS`-style time strings.
//!
//! Components are read right to left and weighted by powers of 60, so `"02:03"` is
//! 2 minutes 3 seconds and `"01:02:03"` is 3723 seconds. An empty string is zero.

use crate::settings::ConfigError;

/// Parse a time string into whole seconds. `key` only labels the error.
pub fn parse_seconds(key: &'static str, value: &str) -> Result<i32, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let invalid = |reason: String| ConfigError::InvalidTime {
        key,
        value: value.to_string(),
        reason,
    };

    let mut total: i32 = 0;
    let mut weight: i32 = 1;
    for (position, component) in trimmed.rsplit(':').enumerate() {
        let component = component.trim();
        if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("component {:?} is not a number", component)));
        }
        let amount: i32 = component
            .parse()
            .map_err(|_| invalid(format!("component {:?} is out of range", component)))?;

        if position > 0 {
            weight = weight
                .checked_mul(60)
                .ok_or_else(|| invalid("too many components".to_string()))?;
        }
        total = amount
            .checked_mul(weight)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or_else(|| invalid("value is out of range".to_string()))?;
    }

    Ok(total)
}
