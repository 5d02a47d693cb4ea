// src/utils/time.rs

use chrono::{DateTime, NaiveDateTime, Utc};

/// Formats a countdown as `m:ss`, e.g. `1:05`.
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Parses the timestamp shapes the backend emits.
///
/// Accepts RFC 3339 and naive timestamps with either a `T` or a space between
/// date and time. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Human "x ago" distance between `then` and `now`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let minutes = (secs as f64 / 60.0).round() as i64;
    let hours = (secs as f64 / 3600.0).round() as i64;
    let days = (secs as f64 / 86_400.0).round() as i64;

    match secs {
        s if s < 30 => "less than a minute ago".to_string(),
        s if s < 90 => "1 minute ago".to_string(),
        s if s < 45 * 60 => format!("{} minutes ago", minutes),
        s if s < 90 * 60 => "about 1 hour ago".to_string(),
        s if s < 24 * 3600 => format!("about {} hours ago", hours),
        s if s < 42 * 3600 => "1 day ago".to_string(),
        s if s < 30 * 86_400 => format!("{} days ago", days),
        s if s < 45 * 86_400 => "about 1 month ago".to_string(),
        s if s < 365 * 86_400 => format!("{} months ago", (days as f64 / 30.0).round() as i64),
        _ => {
            let years = days / 365;
            if years <= 1 {
                "about 1 year ago".to_string()
            } else {
                format!("about {} years ago", years)
            }
        }
    }
}

/// Serde adapter for `DateTime<Utc>` fields using `parse_timestamp`.
pub mod lenient {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
