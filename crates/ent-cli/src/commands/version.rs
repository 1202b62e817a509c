//! Version creation and inspection.

use super::hash::describe_file;
use super::print_json;
use crate::runtime::FileIntegrityService;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use ent_prov::{format_timestamp, FileHash, Version};
use std::fs;
use std::path::{Path, PathBuf};

/// Create a signed version from files on disk or a JSON manifest.
pub fn cmd_create(
    service: &FileIntegrityService,
    work_item: &str,
    files: Vec<PathBuf>,
    manifest: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let entries = match manifest {
        Some(path) => {
            if !files.is_empty() {
                bail!("pass either files or --manifest, not both");
            }
            read_manifest(&path)?
        }
        None => files
            .iter()
            .map(|path| describe_file(path))
            .collect::<Result<Vec<_>>>()?,
    };

    let version = service.create_version(work_item, entries)?;
    if json {
        return print_json(&version);
    }

    println!("{} Version created", "✓".green().bold());
    print_version(&version);
    Ok(())
}

/// Print a stored version.
pub fn cmd_show(service: &FileIntegrityService, version_id: &str, json: bool) -> Result<()> {
    let version = service.get_version(version_id)?;
    if json {
        return print_json(&version);
    }
    println!("{}", "Version".bold().underline());
    print_version(&version);
    Ok(())
}

/// Parse a JSON array of file entries.
pub fn read_manifest(path: &Path) -> Result<Vec<FileHash>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse manifest {}", path.display()))
}

fn print_version(version: &Version) {
    println!("{}: {}", "Version ID".bold(), version.version_id);
    println!("{}: {}", "Work Item".bold(), version.work_item_id);
    println!("{}: {}", "Number".bold(), version.version_number);
    println!(
        "{}: {}",
        "Timestamp".bold(),
        format_timestamp(&version.server_timestamp)
    );
    println!("{}: {}", "Merkle Root".bold(), version.merkle_root);
    println!("{}: {}", "Key ID".bold(), version.kid);
    println!("{}: {}", "Signature".bold(), version.signature);
    println!("{} ({}):", "Files".bold(), version.files.len());
    for file in &version.files {
        println!(
            "  - {} {} ({} bytes)",
            file.content_hash.cyan(),
            file.file_name,
            file.file_size
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_reads_wire_field_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            format!(
                r#"[{{"file_name": "a.txt", "file_size": 10, "sha256_hash": "{}"}}]"#,
                "a".repeat(64)
            ),
        )
        .unwrap();

        let entries = read_manifest(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "a.txt");
        assert_eq!(entries[0].content_hash, "a".repeat(64));
    }

    #[test]
    fn test_manifest_rejects_negative_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            format!(
                r#"[{{"file_name": "a.txt", "file_size": -1, "sha256_hash": "{}"}}]"#,
                "a".repeat(64)
            ),
        )
        .unwrap();

        assert!(read_manifest(&path).is_err());
    }
}
