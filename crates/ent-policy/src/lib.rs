//! Precondition checks for Entrustory requests.
//!
//! Every request is checked in full before any work is done. Checks collect
//! all violations instead of stopping at the first one, so callers can report
//! every bad field at once and the service can guarantee that a rejected
//! request leaves no state behind.
//!
//! Accepted shapes:
//! - identifiers: canonical hyphenated UUID text, version 1-5, RFC 4122 variant
//! - digests: exactly 64 lowercase hex characters
//! - file lists: non-empty, every name non-empty, no digest repeated

use ent_hash::is_hex_digest;
use ent_prov::FileHash;
use std::collections::HashMap;
use thiserror::Error;
use uuid::{Uuid, Variant};

/// A single reason a request was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{field} is not a canonical UUID: {value:?}")]
    InvalidId { field: String, value: String },

    #[error("{field} is not a 64-character lowercase hex SHA-256 digest: {value:?}")]
    InvalidDigest { field: String, value: String },

    #[error("files must contain at least one entry")]
    NoFiles,

    #[error("files[{index}].file_name must not be empty")]
    EmptyFileName { index: usize },

    #[error("files[{index}].sha256_hash duplicates files[{first}].sha256_hash")]
    DuplicateDigest { index: usize, first: usize },
}

impl Violation {
    /// Name of the offending request field.
    pub fn field(&self) -> String {
        match self {
            Violation::InvalidId { field, .. } | Violation::InvalidDigest { field, .. } => {
                field.clone()
            }
            Violation::NoFiles => "files".to_string(),
            Violation::EmptyFileName { index } => format!("files[{index}].file_name"),
            Violation::DuplicateDigest { index, .. } => format!("files[{index}].sha256_hash"),
        }
    }
}

/// Whether `value` is a canonical UUID with version 1-5 and the RFC 4122 variant.
pub fn is_uuid(value: &str) -> bool {
    parse_uuid(value).is_some()
}

fn parse_uuid(value: &str) -> Option<Uuid> {
    // Only the 36-character hyphenated form is accepted.
    if value.len() != 36 {
        return None;
    }
    let id = Uuid::try_parse(value).ok()?;
    let version_ok = (1..=5).contains(&id.get_version_num());
    (version_ok && id.get_variant() == Variant::RFC4122).then_some(id)
}

/// Parse an identifier field, reporting a violation on failure.
pub fn parse_id(field: &str, value: &str) -> Result<Uuid, Violation> {
    parse_uuid(value).ok_or_else(|| Violation::InvalidId {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Check a digest field.
pub fn check_digest(field: &str, value: &str) -> Result<(), Violation> {
    if is_hex_digest(value) {
        Ok(())
    } else {
        Err(Violation::InvalidDigest {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Check a version creation request. Returns the parsed work item id.
pub fn check_create_version(work_item_id: &str, files: &[FileHash]) -> Result<Uuid, Vec<Violation>> {
    let mut violations = Vec::new();

    let work_item = parse_id("work_item_id", work_item_id).map_err(|v| violations.push(v)).ok();

    if files.is_empty() {
        violations.push(Violation::NoFiles);
    }

    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        if file.file_name.is_empty() {
            violations.push(Violation::EmptyFileName { index });
        }

        let field = format!("files[{index}].sha256_hash");
        if let Err(v) = check_digest(&field, &file.content_hash) {
            violations.push(v);
            continue;
        }

        if let Some(&first) = seen.get(file.content_hash.as_str()) {
            violations.push(Violation::DuplicateDigest { index, first });
        } else {
            seen.insert(&file.content_hash, index);
        }
    }

    match work_item {
        Some(id) if violations.is_empty() => Ok(id),
        _ => Err(violations),
    }
}

/// Check a verification request. Returns the parsed version id.
pub fn check_verify_request(version_id: &str, submitted_hash: &str) -> Result<Uuid, Vec<Violation>> {
    let mut violations = Vec::new();

    let version = parse_id("version_id", version_id).map_err(|v| violations.push(v)).ok();
    if let Err(v) = check_digest("sha256_hash", submitted_hash) {
        violations.push(v);
    }

    match version {
        Some(id) if violations.is_empty() => Ok(id),
        _ => Err(violations),
    }
}
