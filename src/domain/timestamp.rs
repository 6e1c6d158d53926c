// Copyright (c) 2025 - Cowboy AI, Inc.
//! Lenient timestamp parsing for stored records
//!
//! Stored data may carry RFC 3339 timestamps or naive ISO-8601 ones without
//! an offset. Naive values are taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an RFC 3339 or naive ISO-8601 timestamp
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// `deserialize_with` helper accepting either timestamp form
pub fn lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_rfc3339_and_naive_forms() {
        let rfc = parse_timestamp("2025-03-01T12:30:00Z").unwrap();
        let offset = parse_timestamp("2025-03-01T13:30:00+01:00").unwrap();
        assert_eq!(rfc, offset);

        let naive = parse_timestamp("2025-03-01T12:30:00.123456").unwrap();
        assert_eq!(naive.hour(), 12);
        assert_eq!(naive.day(), 1);

        assert!(parse_timestamp("yesterday").is_none());
    }
}
