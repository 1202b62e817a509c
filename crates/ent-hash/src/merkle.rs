//! Order-independent Merkle root construction.

use crate::{is_hex_digest, Digest256};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while aggregating leaf digests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("cannot build a Merkle root from zero leaves")]
    EmptyInput,

    #[error("leaf {index} is not a 64-character lowercase hex digest: {leaf:?}")]
    InvalidLeaf { index: usize, leaf: String },
}

/// Hash two child digests into their parent: `SHA256(left || right)` over raw bytes.
pub fn hash_pair(left: &Digest256, right: &Digest256) -> Digest256 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Fold a non-empty set of hex digests into a single Merkle root.
///
/// Leaves are sorted before folding, so the root only depends on which
/// digests are present and not on their order. Each level is reduced by
/// hashing adjacent pairs; an unpaired last element is paired with itself.
/// A single leaf is its own root.
///
/// Duplicates are not removed here. Callers that need set semantics must
/// reject duplicate digests before aggregating.
pub fn build_root<S: AsRef<str>>(hashes: &[S]) -> Result<String, MerkleError> {
    if hashes.is_empty() {
        return Err(MerkleError::EmptyInput);
    }

    let mut level = Vec::with_capacity(hashes.len());
    for (index, leaf) in hashes.iter().enumerate() {
        level.push(decode_leaf(index, leaf.as_ref())?);
    }

    // Byte order equals lexicographic order of the lowercase hex text.
    level.sort_unstable();

    let mut depth = 0usize;
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                hash_pair(left, right)
            })
            .collect();
        depth += 1;
    }
    debug!(leaves = hashes.len(), depth, "built merkle root");

    Ok(hex::encode(level[0]))
}

fn decode_leaf(index: usize, leaf: &str) -> Result<Digest256, MerkleError> {
    let invalid = || MerkleError::InvalidLeaf {
        index,
        leaf: leaf.to_string(),
    };
    if !is_hex_digest(leaf) {
        return Err(invalid());
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(leaf, &mut bytes).map_err(|_| invalid())?;
    Ok(bytes)
}
