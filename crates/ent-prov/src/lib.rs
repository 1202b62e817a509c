//! Signed version records and Ed25519 signing for Entrustory.
//!
//! This crate holds the data model shared by the rest of the workspace, the
//! canonical payload that binds a version's Merkle root to its identity and
//! timestamp, and the [`SigningContext`] that signs and verifies that payload.
//!
//! # Example
//!
//! ```
//! use ent_prov::{canonical_payload, verify_signature, SigningContext};
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! let signing = SigningContext::generate("dev-key-1").unwrap();
//! let payload = canonical_payload(&Uuid::new_v4(), &"f".repeat(64), &Utc::now(), signing.kid());
//!
//! let signature = signing.sign(&payload);
//! assert!(verify_signature(&payload, &signature, signing.public_key_base64()));
//! ```

mod canonical;
mod signature;
pub mod timestamp;
mod types;

pub use canonical::{canonical_payload, PAYLOAD_DELIMITER};
pub use signature::{
    keygen, validate_kid, verify_signature, KeyError, KeyMaterial, SigningContext, ALGORITHM,
    DEFAULT_KID,
};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use types::{
    FileHash, PublicKeyInfo, TimelineEvent, TimelineEventType, VerificationLogEntry,
    VerificationResult, Version, INITIAL_VERSION_NUMBER,
};
