//! Canonical payload construction.

use crate::timestamp::format_timestamp;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Separator between payload fields.
///
/// The delimiter is not escaped. The version id and Merkle root are fixed
/// format, the timestamp has a fixed width, and the kid (the only free-form
/// field) is last and may not contain the delimiter.
pub const PAYLOAD_DELIMITER: char = ':';

/// Build the exact text that is signed for a version:
/// `version_id:merkle_root:server_timestamp:kid`.
pub fn canonical_payload(
    version_id: &Uuid,
    merkle_root: &str,
    server_timestamp: &DateTime<Utc>,
    kid: &str,
) -> String {
    let d = PAYLOAD_DELIMITER;
    format!(
        "{}{d}{merkle_root}{d}{}{d}{kid}",
        version_id.hyphenated(),
        format_timestamp(server_timestamp)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;

    #[test]
    fn test_payload_field_order_and_format() {
        let version_id = Uuid::parse_str("7fb8c7ff-7e9d-44e3-b605-c6219e0f6f56").unwrap();
        let ts = parse_timestamp("2026-02-13T18:40:11.000Z").unwrap();
        let root = "f".repeat(64);

        let payload = canonical_payload(&version_id, &root, &ts, "dev-key-1");

        assert_eq!(
            payload,
            format!("7fb8c7ff-7e9d-44e3-b605-c6219e0f6f56:{root}:2026-02-13T18:40:11.000Z:dev-key-1")
        );
    }

    #[test]
    fn test_payload_uses_lowercase_uuid() {
        let version_id = Uuid::parse_str("7FB8C7FF-7E9D-44E3-B605-C6219E0F6F56").unwrap();
        let ts = parse_timestamp("2026-02-13T18:40:11.000Z").unwrap();

        let payload = canonical_payload(&version_id, "ab", &ts, "k");
        assert!(payload.starts_with("7fb8c7ff-7e9d-44e3-b605-c6219e0f6f56:"));
    }

    #[test]
    fn test_payload_changes_with_every_field() {
        let id = Uuid::parse_str("7fb8c7ff-7e9d-44e3-b605-c6219e0f6f56").unwrap();
        let other_id = Uuid::parse_str("11111111-1111-4111-8111-111111111111").unwrap();
        let ts = parse_timestamp("2026-02-13T18:40:11.000Z").unwrap();
        let later = parse_timestamp("2026-02-13T18:40:11.001Z").unwrap();
        let root = "a".repeat(64);
        let other_root = "b".repeat(64);

        let base = canonical_payload(&id, &root, &ts, "k1");
        assert_ne!(base, canonical_payload(&other_id, &root, &ts, "k1"));
        assert_ne!(base, canonical_payload(&id, &other_root, &ts, "k1"));
        assert_ne!(base, canonical_payload(&id, &root, &later, "k1"));
        assert_ne!(base, canonical_payload(&id, &root, &ts, "k2"));
    }
}
