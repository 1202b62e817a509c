//! # ent-config
//!
//! Layered configuration loading for Entrustory using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables
//! 2. An explicitly named TOML file
//! 3. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! | variable | key |
//! |---|---|
//! | `ENTRUSTORY_SIGNING_PRIVATE_KEY_DER_BASE64` | `signing.private_key_der_base64` |
//! | `ENTRUSTORY_SIGNING_PUBLIC_KEY_DER_BASE64` | `signing.public_key_der_base64` |
//! | `ENTRUSTORY_SIGNING_KID` | `signing.kid` |
//! | `ENTRUSTORY_STORE_PATH` | `store.path` |
//!
//! # Usage
//!
//! ```no_run
//! use ent_config::EntrustoryConfig;
//!
//! let config = EntrustoryConfig::load(None).expect("config");
//! let signing = config.signing.signing_context().expect("signing key");
//! println!("signing as {}", signing.kid());
//! ```

mod error;
mod signing;
mod store;

pub use error::ConfigError;
pub use signing::SigningConfig;
pub use store::StoreConfig;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable holding the signing key identifier.
pub const KID_ENV: &str = "ENTRUSTORY_SIGNING_KID";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EntrustoryConfig {
    #[serde(default)]
    pub signing: SigningConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl EntrustoryConfig {
    /// Load configuration from defaults, an optional TOML file, and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(config_file)?.extract()?)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment
            .merge(section_env("ENTRUSTORY_SIGNING_", "signing"))
            .merge(section_env("ENTRUSTORY_STORE_", "store"));

        // Env values are type-inferred; a key id is always text, so `2024`
        // or `007` must reach the config unchanged.
        if let Ok(kid) = env::var(KID_ENV) {
            figment = figment.merge(Serialized::default("signing.kid", kid));
        }

        Ok(figment)
    }
}

/// Map `<PREFIX><FIELD>` variables onto `<section>.<field>`.
fn section_env(prefix: &str, section: &'static str) -> Env {
    Env::prefixed(prefix).map(move |key| {
        format!("{section}.{}", key.as_str().to_ascii_lowercase()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = EntrustoryConfig::default();
        assert_eq!(config.signing.kid, "dev-key-1");
        assert!(!config.signing.is_configured());
        assert_eq!(config.store.path, Path::new("entrustory-store.json"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            EntrustoryConfig::figment(Some(&missing)),
            Err(ConfigError::MissingFile { .. })
        ));
    }
}
