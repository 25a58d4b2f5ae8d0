//! Turns loosely formatted `--from` / `--to` values into bounded Unix-millisecond timestamps.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use shared::IngestError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%b %d, %Y",
];

/// Normalizes against the current wall clock. See [`normalize_at`].
pub fn normalize(value: Option<&str>, label: &str) -> Result<Option<i64>, IngestError> {
    normalize_at(value, label, Utc::now())
}

/// Accepts a 10-digit (seconds) or 13-digit (milliseconds) epoch string, or any
/// recognisable UTC date/time, and returns Unix milliseconds.
///
/// The result is second aligned and must satisfy `now - 1 year < t <= now`.
/// `None` stays `None`, meaning an open bound.
pub fn normalize_at(
    value: Option<&str>,
    label: &str,
    now: DateTime<Utc>,
) -> Result<Option<i64>, IngestError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let value = raw.trim();

    // Digit-only strings of epoch length never go through the calendar parser.
    let seconds = if is_epoch_literal(value) {
        value[..10]
            .parse::<i64>()
            .map_err(|_| IngestError::invalid_date(label))?
    } else {
        parse_human(value, now)
            .ok_or_else(|| IngestError::invalid_date(label))?
            .timestamp()
    };

    ensure_within_past_year(seconds, label, now)?;
    Ok(Some(seconds * 1000))
}

fn is_epoch_literal(value: &str) -> bool {
    matches!(value.len(), 10 | 13) && value.bytes().all(|b| b.is_ascii_digit())
}

fn ensure_within_past_year(seconds: i64, label: &str, now: DateTime<Utc>) -> Result<(), IngestError> {
    let one_year_ago = now
        .checked_sub_months(Months::new(12))
        .ok_or_else(|| IngestError::out_of_range(label))?;

    if seconds <= one_year_ago.timestamp() || seconds > now.timestamp() {
        return Err(IngestError::out_of_range(label));
    }
    Ok(())
}

fn parse_human(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }

    if let Some(relative) = parse_relative(value, now) {
        return Some(relative);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// `now`, `today`, `yesterday` and `<n> <unit>[s] ago`.
fn parse_relative(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = value.to_ascii_lowercase();
    let midnight = |dt: DateTime<Utc>| dt.date_naive().and_hms_opt(0, 0, 0).map(|n| n.and_utc());

    match lower.as_str() {
        "now" => return Some(now),
        "today" => return midnight(now),
        "yesterday" => return midnight(now - Duration::days(1)),
        _ => {}
    }

    let mut parts = lower.split_whitespace();
    let (amount, unit, ago) = (parts.next()?, parts.next()?, parts.next()?);
    if ago != "ago" || parts.next().is_some() {
        return None;
    }
    let amount: u32 = amount.parse().ok()?;

    match unit.trim_end_matches('s') {
        "sec" | "second" => now.checked_sub_signed(Duration::seconds(amount.into())),
        "min" | "minute" => now.checked_sub_signed(Duration::minutes(amount.into())),
        "h" | "hr" | "hour" => now.checked_sub_signed(Duration::hours(amount.into())),
        "d" | "day" => now.checked_sub_signed(Duration::days(amount.into())),
        "w" | "wk" | "week" => now.checked_sub_signed(Duration::weeks(amount.into())),
        "mo" | "month" => now.checked_sub_months(Months::new(amount)),
        "y" | "yr" | "year" => now.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}
