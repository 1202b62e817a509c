//! Signing key configuration.

use crate::ConfigError;
use ent_prov::{SigningContext, DEFAULT_KID};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

fn default_kid() -> String {
    DEFAULT_KID.to_string()
}

/// Where the process signing key comes from.
///
/// Both key fields must be set to load a persistent key. If either is
/// missing an ephemeral key is generated; signatures made with it cannot be
/// verified after the process exits.
#[derive(Clone, Deserialize, Serialize)]
pub struct SigningConfig {
    /// Base64 PKCS#8 DER private key
    #[serde(default)]
    pub private_key_der_base64: Option<String>,

    /// Base64 SPKI DER public key
    #[serde(default)]
    pub public_key_der_base64: Option<String>,

    /// Key identifier stamped on every signature
    #[serde(default = "default_kid")]
    pub kid: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            private_key_der_base64: None,
            public_key_der_base64: None,
            kid: default_kid(),
        }
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field(
                "private_key_der_base64",
                &self.private_key_der_base64.as_ref().map(|_| "<redacted>"),
            )
            .field("public_key_der_base64", &self.public_key_der_base64)
            .field("kid", &self.kid)
            .finish()
    }
}

impl SigningConfig {
    /// Both halves of the key pair, if both were supplied and non-empty.
    pub fn key_pair(&self) -> Option<(&str, &str)> {
        let private = self.private_key_der_base64.as_deref().filter(|s| !s.trim().is_empty());
        let public = self.public_key_der_base64.as_deref().filter(|s| !s.trim().is_empty());
        private.zip(public)
    }

    /// Whether a persistent key pair is configured.
    pub fn is_configured(&self) -> bool {
        self.key_pair().is_some()
    }

    /// Build the process signing context.
    ///
    /// Supplied key material that fails to load is an error, never a reason
    /// to fall back to a generated key.
    pub fn signing_context(&self) -> Result<SigningContext, ConfigError> {
        if let Some((private, public)) = self.key_pair() {
            let context = SigningContext::from_der_base64(&self.kid, private, public)?;
            info!(kid = %self.kid, "loaded signing key from configuration");
            return Ok(context);
        }

        if self.private_key_der_base64.is_some() || self.public_key_der_base64.is_some() {
            warn!(
                kid = %self.kid,
                "only one half of the signing key pair is configured; generating an ephemeral key"
            );
        } else {
            warn!(kid = %self.kid, "no signing key configured; generating an ephemeral key");
        }
        Ok(SigningContext::generate(&self.kid)?)
    }
}
