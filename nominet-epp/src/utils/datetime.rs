//! Date/time helpers for EPP timestamps.
//!
//! The registry returns `dateTime` values with or without a zone designator and with
//! optional fractional seconds (`2025-03-01T12:00:00.0Z`, `2025-03-01T12:00:00`).
//! Values without a zone are taken as UTC.
//!
//! Also usable as a serde `with` module for `Option<DateTime<Utc>>` (RFC 3339 out,
//! any accepted EPP form in).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Parses an EPP timestamp. Returns `None` for empty or unrecognised input.
pub fn parse_epp_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD` as required by `domain:curExpDate`.
pub fn format_epp_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<String>::deserialize(deserializer)? {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_epp_datetime(&s)
            .map(Some)
            .ok_or_else(|| Error::custom(format!("Invalid EPP timestamp: {s}"))),
        None => Ok(None),
    }
}
