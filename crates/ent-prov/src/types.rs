//! Version and audit record data structures.

use crate::canonical::canonical_payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Version number assigned to every new version. Superseding versions are
/// not supported, so this is the only value in use.
pub const INITIAL_VERSION_NUMBER: u32 = 1;

/// A single file submitted as part of a version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileHash {
    /// Display name of the file (non-empty)
    pub file_name: String,

    /// Size of the file in bytes
    pub file_size: u64,

    /// SHA-256 of the file contents, 64 lowercase hex characters
    #[serde(rename = "sha256_hash")]
    pub content_hash: String,

    /// Opaque location of an encrypted copy of the file, if the client kept one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_storage_path: Option<String>,
}

impl FileHash {
    pub fn new(
        file_name: impl Into<String>,
        file_size: u64,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
            content_hash: content_hash.into(),
            encrypted_storage_path: None,
        }
    }
}

/// A signed, immutable snapshot of a set of files for a work item.
///
/// `merkle_root`, `signature` and `kid` are bound together by the signature
/// over [`Version::canonical_payload`]; changing any of them after creation
/// makes the record fail verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub version_id: Uuid,

    pub version_number: u32,

    /// Work item this version belongs to
    pub work_item_id: Uuid,

    /// Assigned by the server at creation, never taken from the client
    #[serde(with = "crate::timestamp::millis")]
    pub server_timestamp: DateTime<Utc>,

    /// Merkle root over the content hashes of `files`
    pub merkle_root: String,

    /// Base64 Ed25519 signature over the canonical payload
    pub signature: String,

    /// Identifier of the key that produced `signature`
    pub kid: String,

    pub files: Vec<FileHash>,
}

impl Version {
    /// The text that was signed for this version, rebuilt from stored fields.
    pub fn canonical_payload(&self) -> String {
        canonical_payload(
            &self.version_id,
            &self.merkle_root,
            &self.server_timestamp,
            &self.kid,
        )
    }

    /// Whether `content_hash` is one of this version's file digests.
    pub fn contains_hash(&self, content_hash: &str) -> bool {
        self.files.iter().any(|f| f.content_hash == content_hash)
    }

    pub fn content_hashes(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.content_hash.as_str()).collect()
    }
}

/// Outcome of checking one file hash against a recorded version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationResult {
    /// `hash_match && signature_valid`
    pub verified: bool,
    pub hash_match: bool,
    pub signature_valid: bool,
    pub version_id: Uuid,
    pub merkle_root: String,
    #[serde(with = "crate::timestamp::millis")]
    pub server_timestamp: DateTime<Utc>,
    pub kid: String,
}

/// Append-only record of a single verification attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationLogEntry {
    pub id: Uuid,
    pub version_id: Uuid,
    pub submitted_hash: String,

    /// Whether the submitted hash was one of the version's file digests
    pub is_match: bool,

    /// Whether the version's stored signature checked out at the time
    pub signature_valid: bool,

    #[serde(with = "crate::timestamp::millis")]
    pub created_at: DateTime<Utc>,
}

/// Kinds of events recorded on a work item's timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimelineEventType {
    VersionCreated,
}

impl fmt::Display for TimelineEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineEventType::VersionCreated => write!(f, "VersionCreated"),
        }
    }
}

/// Append-only domain event on a work item's timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub work_item_id: Uuid,
    pub version_id: Option<Uuid>,
    pub event_type: TimelineEventType,

    /// Free-form details about the event
    #[serde(default)]
    pub event_metadata: BTreeMap<String, serde_json::Value>,

    #[serde(with = "crate::timestamp::millis")]
    pub created_at: DateTime<Utc>,
}

/// Public half of the signing key, safe to hand to anyone who wants to
/// verify signatures independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyInfo {
    pub kid: String,
    /// Base64 of the SPKI DER public key
    pub public_key: String,
    pub algorithm: String,
}
