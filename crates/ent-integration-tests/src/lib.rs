//! Shared fixtures for the end-to-end test suites.

use ent_prov::{FileHash, SigningContext};
use ent_service::{IntegrityService, MemoryIntegrityService};
use ent_store::{JsonFileStore, MemoryStore};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Key identifier used by every fixture signer.
pub const TEST_KID: &str = "it-key-1";

pub type FileBackedService = IntegrityService<JsonFileStore>;

/// A fresh signer with [`TEST_KID`].
pub fn signer() -> SigningContext {
    SigningContext::generate(TEST_KID).expect("key generation")
}

/// In-memory service plus a handle on its store for inspection.
pub fn memory_service(signing: SigningContext) -> (MemoryIntegrityService, Arc<MemoryStore>) {
    MemoryIntegrityService::in_memory(signing)
}

/// Service persisting to a JSON snapshot at `path`.
pub fn file_service(signing: SigningContext, path: &Path) -> FileBackedService {
    IntegrityService::new(signing, JsonFileStore::open(path).expect("open store"))
}

/// A random work item identifier in canonical text form.
pub fn work_item() -> String {
    Uuid::new_v4().to_string()
}

/// A file entry whose digest is `ch` repeated 64 times.
pub fn repeated_digest_file(name: &str, ch: char) -> FileHash {
    FileHash::new(name, 1024, ch.to_string().repeat(64))
}
