//! Storage collaborators for the integrity service.
//!
//! [`VersionStore`] holds signed versions keyed by id and never overwrites an
//! existing id. [`AuditRecorder`] is the append-only log of verification
//! attempts and timeline events, queried by version or work item in
//! insertion order.
//!
//! [`IntegrityStore`] ties the two together for stores that can commit a
//! version and the timeline event announcing it in one step.
//!
//! Two implementations are provided: [`MemoryStore`] for a single process and
//! tests, and [`JsonFileStore`] which persists a snapshot after every write
//! and can be shared by several processes.

mod file;
mod ledger;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use ent_prov::{TimelineEvent, VerificationLogEntry, Version};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in a storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version {0} already exists")]
    Duplicate(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Keyed storage for signed versions.
pub trait VersionStore: Send + Sync {
    /// Insert a version. Fails with [`StoreError::Duplicate`] if the id exists.
    ///
    /// A successful return is the commit point: once `put` returns `Ok` the
    /// version is visible to `get`, and on error it is not.
    fn put(&self, version: Version) -> Result<(), StoreError>;

    fn get(&self, version_id: &Uuid) -> Result<Option<Version>, StoreError>;
}

/// Append-only audit trail.
pub trait AuditRecorder: Send + Sync {
    fn append_verification_log(
        &self,
        entry: VerificationLogEntry,
    ) -> Result<VerificationLogEntry, StoreError>;

    fn append_timeline_event(&self, event: TimelineEvent) -> Result<TimelineEvent, StoreError>;

    /// Verification attempts against `version_id`, oldest first.
    fn verification_logs(&self, version_id: &Uuid) -> Result<Vec<VerificationLogEntry>, StoreError>;

    /// Timeline of `work_item_id`, oldest first.
    fn timeline(&self, work_item_id: &Uuid) -> Result<Vec<TimelineEvent>, StoreError>;
}

/// Versions and their audit trail behind one commit point.
pub trait IntegrityStore: VersionStore + AuditRecorder {
    /// Insert `version` and append `created` to the timeline as one step.
    ///
    /// Either both become visible or neither does. Fails with
    /// [`StoreError::Duplicate`] if the version id exists.
    fn commit_version(&self, version: Version, created: TimelineEvent) -> Result<(), StoreError>;
}

impl<T: VersionStore + ?Sized> VersionStore for Arc<T> {
    fn put(&self, version: Version) -> Result<(), StoreError> {
        (**self).put(version)
    }

    fn get(&self, version_id: &Uuid) -> Result<Option<Version>, StoreError> {
        (**self).get(version_id)
    }
}

impl<T: AuditRecorder + ?Sized> AuditRecorder for Arc<T> {
    fn append_verification_log(
        &self,
        entry: VerificationLogEntry,
    ) -> Result<VerificationLogEntry, StoreError> {
        (**self).append_verification_log(entry)
    }

    fn append_timeline_event(&self, event: TimelineEvent) -> Result<TimelineEvent, StoreError> {
        (**self).append_timeline_event(event)
    }

    fn verification_logs(&self, version_id: &Uuid) -> Result<Vec<VerificationLogEntry>, StoreError> {
        (**self).verification_logs(version_id)
    }

    fn timeline(&self, work_item_id: &Uuid) -> Result<Vec<TimelineEvent>, StoreError> {
        (**self).timeline(work_item_id)
    }
}

impl<T: IntegrityStore + ?Sized> IntegrityStore for Arc<T> {
    fn commit_version(&self, version: Version, created: TimelineEvent) -> Result<(), StoreError> {
        (**self).commit_version(version, created)
    }
}
