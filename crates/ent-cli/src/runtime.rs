//! Wiring from configuration to a ready-to-use service.

use anyhow::{Context, Result};
use ent_config::EntrustoryConfig;
use ent_service::IntegrityService;
use ent_store::JsonFileStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Service over the JSON snapshot file named in the configuration.
pub type FileIntegrityService = IntegrityService<JsonFileStore>;

/// Load configuration, applying a command-line store path over it.
pub fn load_config(config_file: Option<&Path>, store: Option<PathBuf>) -> Result<EntrustoryConfig> {
    let mut config = EntrustoryConfig::load(config_file).context("failed to load configuration")?;
    if let Some(path) = store {
        config.store.path = path;
    }
    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Build the signing context and open the store. Fails on bad key material.
pub fn open_service(config: &EntrustoryConfig) -> Result<FileIntegrityService> {
    let signing = config
        .signing
        .signing_context()
        .context("failed to initialise signing key")?;

    let store = JsonFileStore::open(&config.store.path)
        .with_context(|| format!("failed to open store {}", config.store.path.display()))?;

    Ok(IntegrityService::new(signing, store))
}
