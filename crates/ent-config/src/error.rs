//! Configuration error types.

use ent_prov::KeyError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A config file was named explicitly but does not exist.
    #[error("Configuration file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// Supplied key material could not be loaded.
    #[error("Invalid signing key material: {0}")]
    Key(#[from] KeyError),
}
