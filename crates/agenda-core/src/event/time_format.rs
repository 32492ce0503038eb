//! Serde helpers for naive wall-clock values.
//!
//! Snapshots written by earlier app versions store times as `HH:MM` (or an
//! empty string when the field was left blank) and creation stamps as
//! RFC 3339 with a trailing `Z`. Both are accepted here; output is always
//! the compact form.

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer};

const TIME_FORMAT: &str = "%H:%M";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Parse a naive timestamp, tolerating an RFC 3339 offset suffix.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
}

/// `Option<NaiveTime>` as `"HH:MM"` / `null`.
pub mod optional_time {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format(TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_time(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{text}'"))),
        }
    }
}

/// `NaiveDateTime` as `"YYYY-MM-DDTHH:MM:SS.mmm"`.
pub mod timestamp {
    use super::*;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_short_and_long_times() {
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("23:59:10"), NaiveTime::from_hms_opt(23, 59, 10));
        assert_eq!(parse_time("9am"), None);
    }

    #[test]
    fn parses_legacy_zulu_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 2)
            .unwrap()
            .and_hms_milli_opt(8, 15, 0, 250)
            .unwrap();
        assert_eq!(parse_timestamp("2024-09-02T08:15:00.250Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-09-02T08:15:00.250"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
