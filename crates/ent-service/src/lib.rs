//! Integrity service for Entrustory.
//!
//! [`IntegrityService`] turns a list of per-file content hashes into a signed
//! [`Version`](ent_prov::Version) and later checks whether a given file hash
//! belongs to a recorded version, appending every check to the audit trail.
//!
//! The signing key, storage and clock are all injected, so the same service
//! runs against an in-memory store in tests and a file-backed store in the CLI.

mod clock;
mod error;
mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ServiceError;
pub use service::{IntegrityService, MemoryIntegrityService};
