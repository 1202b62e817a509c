//! JSON-file backed store.

use crate::ledger::Ledger;
use crate::{AuditRecorder, IntegrityStore, StoreError, VersionStore};
use ent_prov::{TimelineEvent, VerificationLogEntry, Version};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Store that keeps its ledger in a single JSON snapshot file.
///
/// Every mutation takes an exclusive advisory lock on a sibling `.lock` file,
/// re-reads the snapshot, applies the change, writes a uniquely named
/// temporary file and renames it over the target. Several handles, in one
/// process or many, can share a path without losing each other's writes.
/// Readers need no lock: the rename swaps in a complete snapshot.
///
/// Each write rewrites the whole ledger, so its cost grows with the history
/// held in the file. That suits a command-line tool, not a busy service.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Held for the duration of a read-modify-write cycle. Closing the file
/// releases the lock.
struct WriteLock {
    _file: File,
}

impl JsonFileStore {
    /// Open the store at `path`. An existing snapshot must parse.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            lock_path: sibling(&path, ".lock"),
            path,
        };
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Ledger, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Ledger::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn lock(&self) -> Result<WriteLock, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        lock_exclusive(&file)?;
        Ok(WriteLock { _file: file })
    }

    /// Apply `change` to the current snapshot and persist the result.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut Ledger) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock()?;
        let mut ledger = self.load()?;
        let out = change(&mut ledger)?;
        self.persist(&ledger)?;
        Ok(out)
    }

    fn persist(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let json = serde_json::to_vec(ledger)?;
        let tmp = sibling(&self.path, &format!(".{}.tmp", Uuid::new_v4().simple()));

        let written = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        debug!(path = %self.path.display(), versions = ledger.versions.len(), "store snapshot written");
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(unix)]
fn lock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    loop {
        // SAFETY: flock takes a file descriptor owned by `file`, which
        // outlives the call.
        #[allow(unsafe_code)]
        let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if result == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn lock_exclusive(file: &File) -> io::Result<()> {
    // No advisory locking here; handles on one path must not write concurrently.
    let _ = file;
    Ok(())
}

impl VersionStore for JsonFileStore {
    fn put(&self, version: Version) -> Result<(), StoreError> {
        self.update(|ledger| ledger.insert_version(version))
    }

    fn get(&self, version_id: &Uuid) -> Result<Option<Version>, StoreError> {
        Ok(self.load()?.versions.remove(version_id))
    }
}

impl AuditRecorder for JsonFileStore {
    fn append_verification_log(
        &self,
        entry: VerificationLogEntry,
    ) -> Result<VerificationLogEntry, StoreError> {
        self.update(|ledger| {
            ledger.verification_logs.push(entry.clone());
            Ok(entry)
        })
    }

    fn append_timeline_event(&self, event: TimelineEvent) -> Result<TimelineEvent, StoreError> {
        self.update(|ledger| {
            ledger.timeline.push(event.clone());
            Ok(event)
        })
    }

    fn verification_logs(&self, version_id: &Uuid) -> Result<Vec<VerificationLogEntry>, StoreError> {
        Ok(self.load()?.logs_for(version_id))
    }

    fn timeline(&self, work_item_id: &Uuid) -> Result<Vec<TimelineEvent>, StoreError> {
        Ok(self.load()?.timeline_for(work_item_id))
    }
}

impl IntegrityStore for JsonFileStore {
    fn commit_version(&self, version: Version, created: TimelineEvent) -> Result<(), StoreError> {
        self.update(|ledger| ledger.insert_created(version, created))
    }
}
