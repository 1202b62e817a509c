//! Verification of a submitted file against a stored version.

use super::hash::describe_file;
use super::print_json;
use crate::runtime::FileIntegrityService;
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Verify a file (or a precomputed digest) against a version.
///
/// Returns whether the version verified so the caller can set the exit status.
pub fn cmd_verify(
    service: &FileIntegrityService,
    version_id: &str,
    file: Option<PathBuf>,
    hash: Option<String>,
    json: bool,
) -> Result<bool> {
    let submitted = match (file, hash) {
        (Some(path), None) => describe_file(&path)?.content_hash,
        (None, Some(digest)) => digest,
        _ => bail!("pass exactly one of <file> or --hash"),
    };

    let result = service.verify_file(version_id, &submitted)?;
    if json {
        print_json(&result)?;
        return Ok(result.verified);
    }

    let mark = |ok: bool| {
        if ok {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        }
    };
    println!("{} Hash present in version", mark(result.hash_match));
    println!("{} Signature valid", mark(result.signature_valid));
    println!();
    println!("{}", "Summary:".bold().underline());
    println!("  {}: {}", "Version".bold(), result.version_id);
    println!("  {}: {}", "Merkle Root".bold(), result.merkle_root);
    println!("  {}: {}", "Key ID".bold(), result.kid);
    let status = if result.verified {
        "VERIFIED".green().bold()
    } else {
        "NOT VERIFIED".red().bold()
    };
    println!("  {}: {}", "Status".bold(), status);

    Ok(result.verified)
}
