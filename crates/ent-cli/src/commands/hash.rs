//! File hashing.

use super::print_json;
use anyhow::{Context, Result};
use ent_hash::hash_file;
use ent_prov::FileHash;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct HashLine {
    path: PathBuf,
    sha256_hash: String,
}

/// Print the SHA-256 digest of each file.
pub fn cmd_hash(files: Vec<PathBuf>, json: bool) -> Result<()> {
    let mut lines = Vec::with_capacity(files.len());
    for path in files {
        let sha256_hash =
            hash_file(&path).with_context(|| format!("failed to hash {}", path.display()))?;
        lines.push(HashLine { path, sha256_hash });
    }

    if json {
        return print_json(&lines);
    }
    for line in &lines {
        println!("{}  {}", line.sha256_hash, line.path.display());
    }
    Ok(())
}

/// Describe a file on disk as a [`FileHash`] entry.
pub fn describe_file(path: &Path) -> Result<FileHash> {
    let metadata =
        fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    let digest = hash_file(path).with_context(|| format!("failed to hash {}", path.display()))?;
    Ok(FileHash::new(file_name, metadata.len(), digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_describe_file_uses_base_name_and_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"abc").unwrap();

        let entry = describe_file(&path).unwrap();
        assert_eq!(entry.file_name, "report.pdf");
        assert_eq!(entry.file_size, 3);
        assert_eq!(
            entry.content_hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(entry.encrypted_storage_path.is_none());
    }

    #[test]
    fn test_describe_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(describe_file(&dir.path().join("absent")).is_err());
    }
}
