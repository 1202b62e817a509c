//! Ed25519 signing context and signature verification.

use crate::canonical::PAYLOAD_DELIMITER;
use crate::types::PublicKeyInfo;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::{
    Signature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH, SIGNATURE_LENGTH,
};
use std::fmt;
use thiserror::Error;

/// Key identifier used when none is configured.
pub const DEFAULT_KID: &str = "dev-key-1";

/// Signature algorithm name reported alongside the public key.
pub const ALGORITHM: &str = "Ed25519";

/// Errors raised while loading or generating key material.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("private key is not valid base64: {0}")]
    PrivateKeyEncoding(base64::DecodeError),

    #[error("public key is not valid base64: {0}")]
    PublicKeyEncoding(base64::DecodeError),

    #[error("private key is not a PKCS#8 DER Ed25519 key: {0}")]
    PrivateKeyDer(String),

    #[error("public key is not an SPKI DER Ed25519 key: {0}")]
    PublicKeyDer(String),

    #[error("public key does not belong to the supplied private key")]
    KeyMismatch,

    #[error("key identifier {0:?} must be non-empty and must not contain ':'")]
    InvalidKid(String),

    #[error("failed to gather randomness for key generation: {0}")]
    Entropy(String),

    #[error("failed to DER-encode key: {0}")]
    Encoding(String),
}

/// Base64 DER key pair in the form accepted by [`SigningContext::from_der_base64`].
#[derive(Clone)]
pub struct KeyMaterial {
    /// PKCS#8 DER private key, base64
    pub private_key_der_base64: String,
    /// SPKI DER public key, base64
    pub public_key_der_base64: String,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key_der_base64", &"<redacted>")
            .field("public_key_der_base64", &self.public_key_der_base64)
            .finish()
    }
}

/// The process-wide signing key and its identifier.
///
/// Built once at startup and passed to whatever needs to sign. The private
/// key never leaves this type; only the public key is exported.
#[derive(Clone)]
pub struct SigningContext {
    kid: String,
    signing_key: SigningKey,
    public_key_base64: String,
}

impl SigningContext {
    /// Generate a fresh ephemeral key pair.
    ///
    /// Anything signed with it becomes unverifiable once the process exits
    /// unless the key material is exported and supplied again.
    pub fn generate(kid: impl Into<String>) -> Result<Self, KeyError> {
        Self::from_signing_key(kid, random_signing_key()?)
    }

    /// Wrap an existing Ed25519 key.
    pub fn from_signing_key(kid: impl Into<String>, signing_key: SigningKey) -> Result<Self, KeyError> {
        let kid = validate_kid(kid.into())?;
        let public_der = signing_key
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| KeyError::Encoding(e.to_string()))?;

        Ok(Self {
            kid,
            signing_key,
            public_key_base64: STANDARD.encode(public_der.as_bytes()),
        })
    }

    /// Load a key pair supplied as base64 DER (PKCS#8 private, SPKI public).
    ///
    /// Fails if either half does not decode or if the public key does not
    /// belong to the private key.
    pub fn from_der_base64(
        kid: impl Into<String>,
        private_key_der_base64: &str,
        public_key_der_base64: &str,
    ) -> Result<Self, KeyError> {
        let private_der = STANDARD
            .decode(private_key_der_base64.trim())
            .map_err(KeyError::PrivateKeyEncoding)?;
        let public_der = STANDARD
            .decode(public_key_der_base64.trim())
            .map_err(KeyError::PublicKeyEncoding)?;

        let signing_key = SigningKey::from_pkcs8_der(&private_der)
            .map_err(|e| KeyError::PrivateKeyDer(e.to_string()))?;
        let verifying_key = VerifyingKey::from_public_key_der(&public_der)
            .map_err(|e| KeyError::PublicKeyDer(e.to_string()))?;

        if signing_key.verifying_key() != verifying_key {
            return Err(KeyError::KeyMismatch);
        }

        Self::from_signing_key(kid, signing_key)
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Base64 SPKI DER encoding of the public key.
    pub fn public_key_base64(&self) -> &str {
        &self.public_key_base64
    }

    pub fn public_key_info(&self) -> PublicKeyInfo {
        PublicKeyInfo {
            kid: self.kid.clone(),
            public_key: self.public_key_base64.clone(),
            algorithm: ALGORITHM.to_string(),
        }
    }

    /// Export the key pair so it can be re-supplied after a restart.
    pub fn export(&self) -> Result<KeyMaterial, KeyError> {
        encode_key_material(&self.signing_key)
    }

    /// Sign `message` as UTF-8 bytes. Returns the base64 signature.
    ///
    /// Ed25519 signing is deterministic: the same message and key always
    /// produce the same signature.
    pub fn sign(&self, message: &str) -> String {
        STANDARD.encode(self.signing_key.sign(message.as_bytes()).to_bytes())
    }

    /// Check a base64 signature over `message` against a base64 SPKI public key.
    pub fn verify(&self, message: &str, signature_base64: &str, public_key_base64: &str) -> bool {
        verify_signature(message, signature_base64, public_key_base64)
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("kid", &self.kid)
            .field("public_key", &self.public_key_base64)
            .finish_non_exhaustive()
    }
}

/// Verify a base64 Ed25519 signature over `message`.
///
/// Malformed signatures or keys are treated as a failed verification, never
/// as an error.
pub fn verify_signature(message: &str, signature_base64: &str, public_key_base64: &str) -> bool {
    let sig_bytes = match STANDARD.decode(signature_base64) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let sig_array: [u8; SIGNATURE_LENGTH] = match sig_bytes.as_slice().try_into() {
        Ok(array) => array,
        Err(_) => return false,
    };
    let signature = Signature::from_bytes(&sig_array);

    let public_der = match STANDARD.decode(public_key_base64) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let verifying_key = match VerifyingKey::from_public_key_der(&public_der) {
        Ok(key) => key,
        Err(_) => return false,
    };

    verifying_key.verify(message.as_bytes(), &signature).is_ok()
}

/// Generate a new Ed25519 key pair as base64 DER.
pub fn keygen() -> Result<KeyMaterial, KeyError> {
    encode_key_material(&random_signing_key()?)
}

/// Check that a key identifier is usable as the last payload field.
pub fn validate_kid(kid: String) -> Result<String, KeyError> {
    if kid.is_empty() || kid.contains(PAYLOAD_DELIMITER) {
        return Err(KeyError::InvalidKid(kid));
    }
    Ok(kid)
}

fn random_signing_key() -> Result<SigningKey, KeyError> {
    let mut secret = [0u8; SECRET_KEY_LENGTH];
    getrandom::fill(&mut secret).map_err(|e| KeyError::Entropy(e.to_string()))?;
    Ok(SigningKey::from_bytes(&secret))
}

fn encode_key_material(signing_key: &SigningKey) -> Result<KeyMaterial, KeyError> {
    let private_der = signing_key
        .to_pkcs8_der()
        .map_err(|e| KeyError::Encoding(e.to_string()))?;
    let public_der = signing_key
        .verifying_key()
        .to_public_key_der()
        .map_err(|e| KeyError::Encoding(e.to_string()))?;

    Ok(KeyMaterial {
        private_key_der_base64: STANDARD.encode(private_der.as_bytes()),
        public_key_der_base64: STANDARD.encode(public_der.as_bytes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str =
        "7fb8c7ff-7e9d-44e3-b605-c6219e0f6f56:ffff:2026-02-13T18:40:11.000Z:dev-key-1";

    fn fixed_context() -> SigningContext {
        SigningContext::from_signing_key(DEFAULT_KID, SigningKey::from_bytes(&[7u8; 32])).unwrap()
    }

    /// Replace the character at `index` with a different one from the same alphabet.
    fn flip_char(text: &str, index: usize) -> String {
        text.char_indices()
            .map(|(i, c)| {
                if i != index {
                    c
                } else if c == 'A' {
                    'B'
                } else {
                    'A'
                }
            })
            .collect()
    }

    #[test]
    fn test_sign_and_verify_succeeds() {
        let signing = SigningContext::generate("test-key").unwrap();
        let signature = signing.sign(PAYLOAD);

        assert!(signing.verify(PAYLOAD, &signature, signing.public_key_base64()));
        assert!(verify_signature(PAYLOAD, &signature, signing.public_key_base64()));
    }

    #[test]
    fn test_signature_is_64_bytes_base64() {
        let signature = fixed_context().sign(PAYLOAD);
        assert_eq!(STANDARD.decode(&signature).unwrap().len(), SIGNATURE_LENGTH);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signing = fixed_context();
        assert_eq!(signing.sign(PAYLOAD), signing.sign(PAYLOAD));
        assert_eq!(fixed_context().sign(PAYLOAD), signing.sign(PAYLOAD));
    }

    #[test]
    fn test_verify_with_wrong_public_key_fails() {
        let signing = SigningContext::generate("a").unwrap();
        let other = SigningContext::generate("b").unwrap();

        let signature = signing.sign(PAYLOAD);
        assert!(!verify_signature(PAYLOAD, &signature, other.public_key_base64()));
    }

    #[test]
    fn test_verify_modified_payload_fails() {
        let signing = fixed_context();
        let signature = signing.sign(PAYLOAD);

        let tampered = PAYLOAD.replace("dev-key-1", "dev-key-2");
        assert!(!verify_signature(&tampered, &signature, signing.public_key_base64()));
    }

    #[test]
    fn test_every_single_character_tamper_is_detected() {
        let signing = fixed_context();
        let signature = signing.sign(PAYLOAD);
        let public_key = signing.public_key_base64();

        for index in 0..PAYLOAD.len() {
            let tampered = flip_char(PAYLOAD, index);
            assert!(!verify_signature(&tampered, &signature, public_key), "payload index {index}");
        }
        for index in 0..signature.len() {
            let tampered = flip_char(&signature, index);
            assert!(!verify_signature(PAYLOAD, &tampered, public_key), "signature index {index}");
        }
        for index in 0..public_key.len() {
            let tampered = flip_char(public_key, index);
            assert!(!verify_signature(PAYLOAD, &signature, &tampered), "public key index {index}");
        }
    }

    #[test]
    fn test_malformed_signature_returns_false() {
        let signing = fixed_context();
        let public_key = signing.public_key_base64();

        assert!(!verify_signature(PAYLOAD, "not base64!!", public_key));
        assert!(!verify_signature(PAYLOAD, "", public_key));
        assert!(!verify_signature(PAYLOAD, &STANDARD.encode([0u8; 10]), public_key));
        assert!(!verify_signature(PAYLOAD, &STANDARD.encode([0u8; 64]), public_key));
    }

    #[test]
    fn test_malformed_public_key_returns_false() {
        let signing = fixed_context();
        let signature = signing.sign(PAYLOAD);

        assert!(!verify_signature(PAYLOAD, &signature, "%%%"));
        assert!(!verify_signature(PAYLOAD, &signature, &STANDARD.encode([1u8; 32])));
    }

    #[test]
    fn test_keygen_round_trips_through_der() {
        let material = keygen().unwrap();
        let signing = SigningContext::from_der_base64(
            "loaded",
            &material.private_key_der_base64,
            &material.public_key_der_base64,
        )
        .unwrap();

        assert_eq!(signing.public_key_base64(), material.public_key_der_base64);
        let signature = signing.sign(PAYLOAD);
        assert!(verify_signature(PAYLOAD, &signature, &material.public_key_der_base64));
    }

    #[test]
    fn test_export_then_reload_signs_identically() {
        let signing = fixed_context();
        let material = signing.export().unwrap();
        let reloaded = SigningContext::from_der_base64(
            DEFAULT_KID,
            &material.private_key_der_base64,
            &material.public_key_der_base64,
        )
        .unwrap();

        assert_eq!(reloaded.sign(PAYLOAD), signing.sign(PAYLOAD));
    }

    #[test]
    fn test_public_key_is_spki_der() {
        let der = STANDARD.decode(fixed_context().public_key_base64()).unwrap();
        // SEQUENCE { SEQUENCE { OID 1.3.101.112 } BIT STRING (32 bytes) }
        assert_eq!(der.len(), 44);
        assert_eq!(&der[..12], &[0x30u8, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00]);
    }

    #[test]
    fn test_malformed_base64_key_fails_fast() {
        let material = keygen().unwrap();
        assert!(matches!(
            SigningContext::from_der_base64("k", "***", &material.public_key_der_base64),
            Err(KeyError::PrivateKeyEncoding(_))
        ));
        assert!(matches!(
            SigningContext::from_der_base64("k", &material.private_key_der_base64, "***"),
            Err(KeyError::PublicKeyEncoding(_))
        ));
    }

    #[test]
    fn test_malformed_der_key_fails_fast() {
        let material = keygen().unwrap();
        let garbage = STANDARD.encode(b"definitely not der");

        assert!(matches!(
            SigningContext::from_der_base64("k", &garbage, &material.public_key_der_base64),
            Err(KeyError::PrivateKeyDer(_))
        ));
        assert!(matches!(
            SigningContext::from_der_base64("k", &material.private_key_der_base64, &garbage),
            Err(KeyError::PublicKeyDer(_))
        ));
    }

    #[test]
    fn test_mismatched_key_pair_is_rejected() {
        let first = keygen().unwrap();
        let second = keygen().unwrap();

        assert!(matches!(
            SigningContext::from_der_base64(
                "k",
                &first.private_key_der_base64,
                &second.public_key_der_base64
            ),
            Err(KeyError::KeyMismatch)
        ));
    }

    #[test]
    fn test_kid_with_delimiter_is_rejected() {
        assert!(matches!(
            SigningContext::generate("prod:key"),
            Err(KeyError::InvalidKid(_))
        ));
        assert!(matches!(SigningContext::generate(""), Err(KeyError::InvalidKid(_))));
    }

    #[test]
    fn test_public_key_info_reports_algorithm() {
        let info = fixed_context().public_key_info();
        assert_eq!(info.kid, DEFAULT_KID);
        assert_eq!(info.algorithm, "Ed25519");
        assert_eq!(info.public_key, fixed_context().public_key_base64());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let signing = fixed_context();
        let material = signing.export().unwrap();

        assert!(!format!("{signing:?}").contains(&material.private_key_der_base64));
        assert!(!format!("{material:?}").contains(&material.private_key_der_base64));
    }
}
