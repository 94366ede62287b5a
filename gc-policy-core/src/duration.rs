//! Duration literals and age thresholds
//!
//! Age thresholds travel either as whole days or as duration literals such as
//! `168h`, `1h30m` or `-1.5s`. Literals use the same grammar the table admin
//! client accepts, and render back in its canonical form (`168h0m0s`).

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::GcPolicyError;

const NANOS_PER_SEC: u64 = 1_000_000_000;

// Largest magnitude a signed 64-bit nanosecond count can hold (the negative end).
const MAX_MAGNITUDE: u64 = 1 << 63;

/// Elapsed time after which a cell becomes eligible for collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgeThreshold(Duration);

impl AgeThreshold {
    pub fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Whole 24-hour periods
    pub fn from_days(days: u32) -> Self {
        Self(Duration::days(i64::from(days)))
    }

    pub fn zero() -> Self {
        Self(Duration::zero())
    }

    pub fn duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for AgeThreshold {
    type Err = GcPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for AgeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(&self.0))
    }
}

impl Serialize for AgeThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgeThreshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(de::Error::custom)
    }
}

/// Resolve the two surface forms of an age threshold into one value.
///
/// A non-empty `duration` wins; otherwise `days` counts whole 24-hour periods.
/// Neither being set yields a zero threshold.
pub fn resolve_max_age(days: Option<u32>, duration: Option<&str>) -> Result<AgeThreshold, GcPolicyError> {
    match duration {
        Some(literal) if !literal.is_empty() => literal.parse(),
        _ => Ok(AgeThreshold::from_days(days.unwrap_or(0))),
    }
}

/// Parse a duration literal: an optional sign followed by one or more
/// `<decimal><unit>` groups, e.g. `300ms`, `-1.5h` or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
pub fn parse_duration(literal: &str) -> Result<Duration, GcPolicyError> {
    let invalid = |reason: &'static str| GcPolicyError::invalid_duration(literal, reason);

    let mut rest = literal;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(invalid("invalid duration"));
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        let first = rest.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid("invalid duration"));
        }

        let (whole, after) = leading_int(rest).ok_or_else(|| invalid("overflow"))?;
        let has_whole = after.len() != rest.len();
        rest = after;

        let mut fraction = 0;
        let mut scale = 1.0;
        let mut has_fraction = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, digits_scale, after) = leading_fraction(after_dot);
            has_fraction = after.len() != after_dot.len();
            fraction = digits;
            scale = digits_scale;
            rest = after;
        }
        if !has_whole && !has_fraction {
            return Err(invalid("invalid duration"));
        }

        let unit_len = rest
            .bytes()
            .position(|b| b == b'.' || b.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(invalid("missing unit"));
        }
        let (unit, after) = rest.split_at(unit_len);
        rest = after;
        let unit = unit_nanos(unit).ok_or_else(|| invalid("unknown unit"))?;

        if whole > MAX_MAGNITUDE / unit {
            return Err(invalid("overflow"));
        }
        let mut value = whole * unit;
        if fraction > 0 {
            value += (fraction as f64 * (unit as f64 / scale)) as u64;
            if value > MAX_MAGNITUDE {
                return Err(invalid("overflow"));
            }
        }

        total = total
            .checked_add(value)
            .filter(|sum| *sum <= MAX_MAGNITUDE)
            .ok_or_else(|| invalid("overflow"))?;
    }

    let nanos = if negative {
        (total as i64).wrapping_neg()
    } else {
        i64::try_from(total).map_err(|_| invalid("overflow"))?
    };
    Ok(Duration::nanoseconds(nanos))
}

/// Render a duration the way the admin client reports it: `0s`, `750µs`,
/// `1.5s`, `1m30s`, `168h0m0s`.
pub fn format_duration(duration: &Duration) -> String {
    let sign = if *duration < Duration::zero() { "-" } else { "" };
    let nanos = u128::from(duration.num_seconds().unsigned_abs()) * u128::from(NANOS_PER_SEC)
        + u128::from(duration.subsec_nanos().unsigned_abs());

    if nanos < u128::from(NANOS_PER_SEC) {
        if nanos == 0 {
            return "0s".to_string();
        }
        let (precision, unit) = match nanos {
            n if n < 1_000 => return format!("{sign}{n}ns"),
            n if n < 1_000_000 => (3, "µs"),
            _ => (6, "ms"),
        };
        let (frac, whole) = format_fraction(nanos, precision);
        return format!("{sign}{whole}{frac}{unit}");
    }

    let (frac, mut rest) = format_fraction(nanos, 9);
    let mut out = format!("{}{}s", rest % 60, frac);
    rest /= 60;
    if rest > 0 {
        out = format!("{}m{}", rest % 60, out);
        rest /= 60;
        if rest > 0 {
            out = format!("{rest}h{out}");
        }
    }
    format!("{sign}{out}")
}

// Splits off `precision` decimal digits, dropping trailing zeros (and the dot
// when nothing is left).
fn format_fraction(mut value: u128, precision: usize) -> (String, u128) {
    let mut digits = Vec::with_capacity(precision);
    let mut significant = false;
    for _ in 0..precision {
        let digit = (value % 10) as u8;
        significant = significant || digit != 0;
        if significant {
            digits.push(char::from(b'0' + digit));
        }
        value /= 10;
    }
    if digits.is_empty() {
        return (String::new(), value);
    }
    let frac = std::iter::once('.').chain(digits.into_iter().rev()).collect();
    (frac, value)
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<(u64, &str)> {
    let end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    let mut value: u64 = 0;
    for b in s[..end].bytes() {
        if value > MAX_MAGNITUDE / 10 {
            return None;
        }
        value = value * 10 + u64::from(b - b'0');
        if value > MAX_MAGNITUDE {
            return None;
        }
    }
    Some((value, &s[end..]))
}

// Digits past the point of overflow are consumed but ignored.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    let mut value: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    for b in s[..end].bytes() {
        if overflow || value > (MAX_MAGNITUDE - 1) / 10 {
            overflow = true;
            continue;
        }
        let next = value * 10 + u64::from(b - b'0');
        if next > MAX_MAGNITUDE {
            overflow = true;
            continue;
        }
        value = next;
        scale *= 10.0;
    }
    (value, scale, &s[end..])
}
