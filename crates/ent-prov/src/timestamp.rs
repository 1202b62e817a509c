//! Server timestamp formatting.
//!
//! Timestamps are ISO-8601 UTC with millisecond precision and a `Z` suffix,
//! e.g. `2026-02-13T18:40:11.000Z`. The same text is used for display,
//! storage and the signed payload, so formatting must never drift.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Render a timestamp in the canonical millisecond format.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|ts| ts.with_timezone(&Utc))
}

/// Drop sub-millisecond precision so the stored value formats losslessly.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

/// Serde adapter for `DateTime<Utc>` fields using [`format_timestamp`].
pub mod millis {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_has_millis_and_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 13, 18, 40, 11).unwrap();
        assert_eq!(format_timestamp(&ts), "2026-02-13T18:40:11.000Z");
    }

    #[test]
    fn test_truncate_then_format_round_trips() {
        let ts = Utc.timestamp_opt(1_760_000_000, 123_456_789).unwrap();
        let truncated = truncate_to_millis(ts);

        let text = format_timestamp(&truncated);
        assert!(text.ends_with(".123Z"));
        assert_eq!(parse_timestamp(&text).unwrap(), truncated);
    }

    #[test]
    fn test_parse_normalizes_offset_to_utc() {
        let parsed = parse_timestamp("2026-02-13T20:40:11.000+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2026-02-13T18:40:11.000Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
