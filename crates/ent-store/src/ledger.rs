//! Record layout shared by the store implementations.

use crate::StoreError;
use ent_prov::{TimelineEvent, VerificationLogEntry, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Versions by id plus the two insertion-ordered audit lists.
///
/// This is also the on-disk JSON layout of [`crate::JsonFileStore`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Ledger {
    #[serde(default)]
    pub versions: BTreeMap<Uuid, Version>,

    #[serde(default)]
    pub verification_logs: Vec<VerificationLogEntry>,

    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

impl Ledger {
    pub fn insert_version(&mut self, version: Version) -> Result<(), StoreError> {
        if self.versions.contains_key(&version.version_id) {
            return Err(StoreError::Duplicate(version.version_id));
        }
        self.versions.insert(version.version_id, version);
        Ok(())
    }

    pub fn insert_created(&mut self, version: Version, created: TimelineEvent) -> Result<(), StoreError> {
        self.insert_version(version)?;
        self.timeline.push(created);
        Ok(())
    }

    pub fn logs_for(&self, version_id: &Uuid) -> Vec<VerificationLogEntry> {
        self.verification_logs
            .iter()
            .filter(|entry| &entry.version_id == version_id)
            .cloned()
            .collect()
    }

    pub fn timeline_for(&self, work_item_id: &Uuid) -> Vec<TimelineEvent> {
        self.timeline
            .iter()
            .filter(|event| &event.work_item_id == work_item_id)
            .cloned()
            .collect()
    }
}
