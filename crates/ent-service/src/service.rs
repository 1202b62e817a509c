//! Version creation and file verification.

use crate::clock::{Clock, SystemClock};
use crate::error::{ServiceError, ServiceResult};
use ent_hash::build_root;
use ent_policy::{check_create_version, check_verify_request, parse_id};
use ent_prov::timestamp::truncate_to_millis;
use ent_prov::{
    canonical_payload, FileHash, PublicKeyInfo, SigningContext, TimelineEvent, TimelineEventType,
    VerificationLogEntry, VerificationResult, Version, INITIAL_VERSION_NUMBER,
};
use ent_store::{AuditRecorder, IntegrityStore, MemoryStore, VersionStore};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service backed by a single shared [`MemoryStore`].
pub type MemoryIntegrityService = IntegrityService<Arc<MemoryStore>>;

/// Creates signed versions and verifies files against them.
///
/// Both operations check their input in full before touching storage, so a
/// rejected request never leaves a partial record behind.
pub struct IntegrityService<S> {
    signing: SigningContext,
    store: S,
    clock: Box<dyn Clock>,
}

impl MemoryIntegrityService {
    /// Service over a fresh in-memory store. Returns the store as well so
    /// callers can inspect it.
    pub fn in_memory(signing: SigningContext) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = IntegrityService::new(signing, Arc::clone(&store));
        (service, store)
    }
}

impl<S: IntegrityStore> IntegrityService<S> {
    pub fn new(signing: SigningContext, store: S) -> Self {
        Self {
            signing,
            store,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the time source used for server timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn signing(&self) -> &SigningContext {
        &self.signing
    }

    pub fn public_key(&self) -> PublicKeyInfo {
        self.signing.public_key_info()
    }

    /// Record a new signed version of `files` for `work_item_id`.
    ///
    /// The version id and timestamp are assigned here. The version and its
    /// `VersionCreated` timeline event are committed together: both become
    /// visible once the store accepts them, and neither does on error.
    pub fn create_version(&self, work_item_id: &str, files: Vec<FileHash>) -> ServiceResult<Version> {
        let work_item_id = check_create_version(work_item_id, &files).map_err(ServiceError::Validation)?;

        let version_id = Uuid::new_v4();
        let server_timestamp = truncate_to_millis(self.clock.now());
        let leaves: Vec<&str> = files.iter().map(|f| f.content_hash.as_str()).collect();
        let merkle_root = build_root(&leaves)?;
        let kid = self.signing.kid().to_string();

        let payload = canonical_payload(&version_id, &merkle_root, &server_timestamp, &kid);
        let signature = self.signing.sign(&payload);

        let version = Version {
            version_id,
            version_number: INITIAL_VERSION_NUMBER,
            work_item_id,
            server_timestamp,
            merkle_root,
            signature,
            kid,
            files,
        };
        self.store.commit_version(version.clone(), version_created_event(&version))?;

        info!(
            %version_id,
            %work_item_id,
            merkle_root = %version.merkle_root,
            files = version.files.len(),
            kid = %version.kid,
            "version created"
        );

        Ok(version)
    }

    /// Fetch a recorded version.
    pub fn get_version(&self, version_id: &str) -> ServiceResult<Version> {
        let version_id = parse_id("version_id", version_id).map_err(|v| ServiceError::Validation(vec![v]))?;
        self.load_version(&version_id)
    }

    /// Check whether `submitted_hash` is one of the files of a recorded
    /// version and whether that version's signature still holds.
    ///
    /// The attempt is logged whatever the outcome.
    pub fn verify_file(&self, version_id: &str, submitted_hash: &str) -> ServiceResult<VerificationResult> {
        let version_id = check_verify_request(version_id, submitted_hash).map_err(ServiceError::Validation)?;
        let version = self.load_version(&version_id)?;

        let hash_match = version.contains_hash(submitted_hash);
        // Rebuilt from the stored record only, never from request data.
        let signature_valid = self.signing.verify(
            &version.canonical_payload(),
            &version.signature,
            self.signing.public_key_base64(),
        );
        let verified = hash_match && signature_valid;

        if !signature_valid {
            warn!(
                %version_id,
                stored_kid = %version.kid,
                active_kid = %self.signing.kid(),
                "stored signature does not verify under the active key"
            );
        }

        self.store.append_verification_log(VerificationLogEntry {
            id: Uuid::new_v4(),
            version_id,
            submitted_hash: submitted_hash.to_string(),
            is_match: hash_match,
            signature_valid,
            created_at: truncate_to_millis(self.clock.now()),
        })?;

        info!(%version_id, hash_match, signature_valid, verified, "file verification");

        Ok(VerificationResult {
            verified,
            hash_match,
            signature_valid,
            version_id,
            merkle_root: version.merkle_root,
            server_timestamp: version.server_timestamp,
            kid: version.kid,
        })
    }

    /// Events for a work item, oldest first. Unknown work items have an empty timeline.
    pub fn timeline(&self, work_item_id: &str) -> ServiceResult<Vec<TimelineEvent>> {
        let work_item_id =
            parse_id("work_item_id", work_item_id).map_err(|v| ServiceError::Validation(vec![v]))?;
        Ok(self.store.timeline(&work_item_id)?)
    }

    /// Verification attempts against a recorded version, oldest first.
    pub fn verification_logs(&self, version_id: &str) -> ServiceResult<Vec<VerificationLogEntry>> {
        let version_id = parse_id("version_id", version_id).map_err(|v| ServiceError::Validation(vec![v]))?;
        self.load_version(&version_id)?;
        Ok(self.store.verification_logs(&version_id)?)
    }

    fn load_version(&self, version_id: &Uuid) -> ServiceResult<Version> {
        self.store.get(version_id)?.ok_or(ServiceError::NotFound {
            kind: "version",
            id: *version_id,
        })
    }
}

fn version_created_event(version: &Version) -> TimelineEvent {
    let mut event_metadata = BTreeMap::new();
    event_metadata.insert("version_number".to_string(), json!(version.version_number));
    event_metadata.insert("merkle_root".to_string(), json!(version.merkle_root));
    event_metadata.insert("file_count".to_string(), json!(version.files.len()));
    event_metadata.insert("kid".to_string(), json!(version.kid));

    TimelineEvent {
        id: Uuid::new_v4(),
        work_item_id: version.work_item_id,
        version_id: Some(version.version_id),
        event_type: TimelineEventType::VersionCreated,
        event_metadata,
        created_at: version.server_timestamp,
    }
}
