//! Validated backend name type.

use super::BackendDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a backend name.
const MAX_NAME_LENGTH: usize = 100;

/// Non-empty backend identifier.
///
/// Backend names key the vendor registry and are what deployments write in
/// their configuration to select a statically linked backend (e.g. `oracle`,
/// `hydra-oracle`, `mem`). Names are case-sensitive: `Oracle` and `oracle`
/// are different backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendName(String);

impl BackendName {
    /// Creates a validated backend name.
    ///
    /// Surrounding whitespace is trimmed; everything else, case included,
    /// is kept as given.
    ///
    /// # Errors
    ///
    /// Returns [`BackendDomainError::EmptyBackendName`] when the value is empty
    /// after trimming, or [`BackendDomainError::BackendNameTooLong`] when it
    /// exceeds 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, BackendDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(BackendDomainError::EmptyBackendName);
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(BackendDomainError::BackendNameTooLong(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the backend name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BackendName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BackendName {
    type Error = BackendDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BackendName> for String {
    fn from(name: BackendName) -> Self {
        name.0
    }
}
