//! Symmetric key material handed to key-registry managers.

use super::BackendDomainError;
use sha2::{Digest, Sha256};
use std::fmt;

/// Minimum accepted length of a system secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 16;

/// Length of the derived key, in bytes.
const KEY_LENGTH: usize = 32;

/// Number of digest bytes shown in a fingerprint.
const FINGERPRINT_BYTES: usize = 8;

/// A 256-bit symmetric key used to seal stored JSON Web Keys.
///
/// The key bytes never appear in `Debug` output; use
/// [`KeyMaterial::fingerprint`] to correlate keys in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial([u8; KEY_LENGTH]);

impl KeyMaterial {
    /// Derives key material from a configured system secret.
    ///
    /// The key is the SHA-256 digest of the secret's UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError::SecretTooShort`] when the secret is
    /// shorter than [`MIN_SECRET_LENGTH`] bytes.
    pub fn from_secret(secret: &str) -> Result<Self, BackendDomainError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(BackendDomainError::SecretTooShort {
                minimum: MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }
        Ok(Self(Sha256::digest(secret.as_bytes()).into()))
    }

    /// Wraps raw key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    /// Returns a short hex fingerprint of the key, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        Sha256::digest(self.0)
            .iter()
            .take(FINGERPRINT_BYTES)
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
