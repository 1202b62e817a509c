//! Content hashing and Merkle aggregation for Entrustory versions.
//!
//! Every digest handled by the workspace is SHA-256 rendered as 64 lowercase
//! hex characters. [`build_root`] folds a set of such digests into a single
//! root that does not depend on the order the digests were submitted in.

mod merkle;

pub use merkle::{build_root, hash_pair, MerkleError};

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Raw 32-byte SHA-256 output.
pub type Digest256 = [u8; 32];

/// Length of a digest rendered as hex text.
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash a byte slice.
pub fn sha256(bytes: &[u8]) -> Digest256 {
    Sha256::digest(bytes).into()
}

/// Hash a byte slice and render the digest as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}

/// Stream a file through SHA-256 without loading it into memory.
pub fn hash_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Check that `text` is exactly 64 lowercase hex characters.
pub fn is_hex_digest(text: &str) -> bool {
    text.len() == DIGEST_HEX_LEN && text.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
