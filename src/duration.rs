// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Prometheus-style durations
//!
//! A [`Duration`] is a non-negative count of nanoseconds that renders in the
//! compact single-unit form used across Prometheus and Alertmanager files:
//! the largest unit that divides the value evenly wins (`3600s` → `1h`,
//! `90s` → `90s`, `1500ms` → `1500ms`).

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const NANOS_PER_MILLI: u64 = 1_000_000;
const MILLIS_PER_SECOND: u64 = 1_000;

/// Units tried from largest to smallest when formatting whole seconds
const SECOND_UNITS: [(&str, u64); 3] = [("d", 86_400), ("h", 3_600), ("m", 60)];

/// A non-negative duration with Prometheus formatting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u64);

impl Duration {
    /// The zero duration (omitted from wire output)
    pub const ZERO: Duration = Duration(0);

    pub const fn from_nanos(nanos: u64) -> Self {
        Duration(nanos)
    }

    pub const fn millis(ms: u64) -> Self {
        Duration(ms * NANOS_PER_MILLI)
    }

    pub const fn seconds(secs: u64) -> Self {
        Duration(secs * MILLIS_PER_SECOND * NANOS_PER_MILLI)
    }

    pub const fn minutes(mins: u64) -> Self {
        Self::seconds(mins * 60)
    }

    pub const fn hours(hours: u64) -> Self {
        Self::seconds(hours * 3_600)
    }

    pub const fn days(days: u64) -> Self {
        Self::seconds(days * 86_400)
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    pub const fn as_millis(&self) -> u64 {
        self.0 / NANOS_PER_MILLI
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a Prometheus duration such as `15s`, `1h30m` or `500ms`
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(Error::InvalidInput("empty duration".into()));
        }
        if s == "0" {
            return Ok(Duration::ZERO);
        }

        let bytes = s.as_bytes();
        let mut pos = 0;
        let mut total: u64 = 0;
        while pos < bytes.len() {
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if start == pos {
                return Err(Error::InvalidInput(format!("invalid duration '{}'", input)));
            }
            let value: u64 = s[start..pos]
                .parse()
                .map_err(|_| Error::InvalidInput(format!("invalid duration '{}'", input)))?;

            let unit_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
                pos += 1;
            }
            let nanos_per_unit = match &s[unit_start..pos] {
                "ms" => NANOS_PER_MILLI,
                "s" => Self::seconds(1).0,
                "m" => Self::minutes(1).0,
                "h" => Self::hours(1).0,
                "d" => Self::days(1).0,
                "w" => Self::days(7).0,
                "y" => Self::days(365).0,
                other => {
                    return Err(Error::InvalidInput(format!(
                        "unknown duration unit '{}' in '{}'",
                        other, input
                    )))
                }
            };
            total = value
                .checked_mul(nanos_per_unit)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| Error::InvalidInput(format!("duration '{}' overflows", input)))?;
        }
        Ok(Duration(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0s");
        }
        // Sub-millisecond remainders are truncated; Prometheus has no smaller unit.
        let millis = self.0 / NANOS_PER_MILLI;
        if millis % MILLIS_PER_SECOND != 0 || millis == 0 {
            return write!(f, "{}ms", millis);
        }
        let secs = millis / MILLIS_PER_SECOND;
        for (unit, size) in SECOND_UNITS {
            if secs % size == 0 {
                return write!(f, "{}{}", secs / size, unit);
            }
        }
        write!(f, "{}s", secs)
    }
}

impl FromStr for Duration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Duration::parse(s)
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Duration(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl From<Duration> for std::time::Duration {
    fn from(d: Duration) -> Self {
        std::time::Duration::from_nanos(d.0)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DurationVisitor;

impl<'de> Visitor<'de> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string such as \"15s\" or a number of seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Duration, E> {
        Duration::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Duration, E> {
        Ok(Duration::seconds(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Duration, E> {
        u64::try_from(v)
            .map(Duration::seconds)
            .map_err(|_| E::custom("durations are non-negative"))
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prefers_largest_even_unit() {
        assert_eq!(Duration::seconds(15).to_string(), "15s");
        assert_eq!(Duration::seconds(3600).to_string(), "1h");
        assert_eq!(Duration::seconds(90).to_string(), "90s");
        assert_eq!(Duration::minutes(5).to_string(), "5m");
        assert_eq!(Duration::hours(4).to_string(), "4h");
        assert_eq!(Duration::hours(48).to_string(), "2d");
        assert_eq!(Duration::minutes(90).to_string(), "90m");
    }

    #[test]
    fn test_format_sub_second() {
        assert_eq!(Duration::millis(500).to_string(), "500ms");
        assert_eq!(Duration::millis(1500).to_string(), "1500ms");
        assert_eq!(Duration::millis(2000).to_string(), "2s");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(Duration::ZERO.to_string(), "0s");
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(Duration::parse("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(Duration::parse("1m30s").unwrap(), Duration::seconds(90));
        assert_eq!(Duration::parse("250ms").unwrap(), Duration::millis(250));
        assert_eq!(Duration::parse("1w").unwrap(), Duration::days(7));
        assert_eq!(Duration::parse("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Duration::parse("").is_err());
        assert!(Duration::parse("15").is_err());
        assert!(Duration::parse("5x").is_err());
        assert!(Duration::parse("m5").is_err());
    }

    #[test]
    fn test_parse_then_format_normalizes() {
        let d: Duration = "60m".parse().unwrap();
        assert_eq!(d.to_string(), "1h");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Duration::minutes(5)).unwrap();
        assert_eq!(json, "\"5m\"");
        let back: Duration = serde_json::from_str("\"2h\"").unwrap();
        assert_eq!(back, Duration::hours(2));
    }

    #[test]
    fn test_std_conversion() {
        let d: Duration = std::time::Duration::from_secs(30).into();
        assert_eq!(d, Duration::seconds(30));
    }
}
