//! Temporal literal parsing
//!
//! Date, DateTime, Timestamp and Duration values are stored as signed
//! nanosecond ticks; TimestampTZ values are stored as a canonical RFC 3339
//! string that keeps the original offset. These helpers turn schema default
//! literals into those stored forms.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};

const NANOS_PER_MICRO: i128 = 1_000;
const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;

/// Parse `YYYY-MM-DD` into ticks at midnight UTC.
pub fn parse_date(s: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_nanos_opt()
}

/// Parse a naive `YYYY-MM-DDTHH:MM:SS[.f]` (a space separator is also
/// accepted) into ticks, interpreting it as UTC.
pub fn parse_datetime(s: &str) -> Option<i64> {
    let s = s.trim();
    let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    dt.and_utc().timestamp_nanos_opt()
}

/// Parse an RFC 3339 instant into UTC ticks.
pub fn parse_timestamp(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s.trim()).ok()?.timestamp_nanos_opt()
}

/// Parse an RFC 3339 instant into its canonical offset-preserving form.
pub fn parse_timestamptz(s: &str) -> Option<String> {
    let dt = DateTime::parse_from_rfc3339(s.trim()).ok()?;
    Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Parse a duration such as `1h30m`, `250ms` or `-1.5s` into nanoseconds.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is allowed.
pub fn parse_duration(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, mut rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest == "0" {
        return Some(0);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_end == 0 {
            return None;
        }
        let number = &rest[..num_end];
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = match &rest[..unit_end] {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SECOND,
            "m" => NANOS_PER_MINUTE,
            "h" => NANOS_PER_HOUR,
            _ => return None,
        };
        rest = &rest[unit_end..];

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let whole: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        total = total.checked_add(whole.checked_mul(unit)?)?;

        // Fractions beyond nanosecond resolution are truncated.
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        if !frac_digits.is_empty() {
            let frac: i128 = frac_digits.parse().ok()?;
            let scale = 10i128.pow(frac_digits.len() as u32);
            total = total.checked_add(frac * unit / scale)?;
        }
    }

    let signed = if negative { -total } else { total };
    i64::try_from(signed).ok()
}
