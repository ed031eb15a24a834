//! Cache lifetime parsing and resolution.

/// One year. Used whenever the client sends no usable `maxage`.
pub const MAX_AGE_DEFAULT: u64 = 60 * 60 * 24 * 365;

/// Parse a client-supplied lifetime into seconds.
///
/// Accepts a non-negative integer with an optional unit suffix: `s`, `m`,
/// `h`, `d`, `w`, `M` (30 days) or `y` (365 days). Bare numbers are seconds.
/// Anything else, including values that overflow, yields `None`.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.char_indices().last() {
        Some((idx, unit)) if unit.is_ascii_alphabetic() => (&raw[..idx], unit_seconds(unit)?),
        Some(_) => (raw, 1),
        None => return None,
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(60 * 60),
        'd' => Some(60 * 60 * 24),
        'w' => Some(60 * 60 * 24 * 7),
        'M' => Some(60 * 60 * 24 * 30),
        'y' => Some(MAX_AGE_DEFAULT),
        _ => None,
    }
}

/// Pick the lifetime for a response from the raw `maxage` argument.
///
/// A malformed value is logged and replaced by `default`; the client is
/// never told.
pub fn resolve_max_age(raw: Option<&str>, default: u64) -> u64 {
    match raw {
        Some(raw) => parse_duration_seconds(raw).unwrap_or_else(|| {
            tracing::debug!(maxage = %raw, default, "Ignoring malformed maxage");
            default
        }),
        None => default,
    }
}
