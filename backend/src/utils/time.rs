//! Compact duration strings used for token lifetimes (`"900"`, `"15m"`, `"7d"`).

pub const DEFAULT_TTL_SECONDS: u64 = 900;

/// Parses a lifetime into seconds.
///
/// A bare integer is taken as seconds; `<n>s`, `<n>m`, `<n>h` and `<n>d` scale
/// accordingly. Anything else, including values that overflow, yields
/// [`DEFAULT_TTL_SECONDS`].
pub fn parse_ttl_seconds(raw: &str) -> u64 {
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() {
        return DEFAULT_TTL_SECONDS;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse().unwrap_or(DEFAULT_TTL_SECONDS);
    }

    let Some(unit) = value.chars().last() else {
        return DEFAULT_TTL_SECONDS;
    };
    let amount = &value[..value.len() - unit.len_utf8()];
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_TTL_SECONDS;
    }
    let multiplier: u64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 60 * 60 * 24,
        _ => return DEFAULT_TTL_SECONDS,
    };

    amount
        .parse::<u64>()
        .ok()
        .and_then(|amount| amount.checked_mul(multiplier))
        .unwrap_or(DEFAULT_TTL_SECONDS)
}
