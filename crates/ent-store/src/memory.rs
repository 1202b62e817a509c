//! In-process store.

use crate::ledger::Ledger;
use crate::{AuditRecorder, IntegrityStore, StoreError, VersionStore};
use ent_prov::{TimelineEvent, VerificationLogEntry, Version};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Store that keeps everything in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>, StoreError> {
        self.ledger.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>, StoreError> {
        self.ledger.write().map_err(|_| StoreError::Poisoned)
    }

    /// Number of versions held.
    pub fn version_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.versions.len())
    }

    /// Number of verification log entries across all versions.
    pub fn verification_log_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.verification_logs.len())
    }

    /// Number of timeline events across all work items.
    pub fn timeline_event_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.timeline.len())
    }
}

impl VersionStore for MemoryStore {
    fn put(&self, version: Version) -> Result<(), StoreError> {
        self.write()?.insert_version(version)
    }

    fn get(&self, version_id: &Uuid) -> Result<Option<Version>, StoreError> {
        Ok(self.read()?.versions.get(version_id).cloned())
    }
}

impl AuditRecorder for MemoryStore {
    fn append_verification_log(
        &self,
        entry: VerificationLogEntry,
    ) -> Result<VerificationLogEntry, StoreError> {
        self.write()?.verification_logs.push(entry.clone());
        Ok(entry)
    }

    fn append_timeline_event(&self, event: TimelineEvent) -> Result<TimelineEvent, StoreError> {
        self.write()?.timeline.push(event.clone());
        Ok(event)
    }

    fn verification_logs(&self, version_id: &Uuid) -> Result<Vec<VerificationLogEntry>, StoreError> {
        Ok(self.read()?.logs_for(version_id))
    }

    fn timeline(&self, work_item_id: &Uuid) -> Result<Vec<TimelineEvent>, StoreError> {
        Ok(self.read()?.timeline_for(work_item_id))
    }
}

impl IntegrityStore for MemoryStore {
    fn commit_version(&self, version: Version, created: TimelineEvent) -> Result<(), StoreError> {
        self.write()?.insert_created(version, created)
    }
}
