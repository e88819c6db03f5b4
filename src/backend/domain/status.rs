//! Connector lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a backend connector.
///
/// Status only moves forward: `Unresolved → Resolved → Connected`. A failed
/// resolution or connection attempt leaves the previous status in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No backend implementation has been obtained yet.
    Unresolved,
    /// The backend implementation is available but not connected.
    Resolved,
    /// A live connection handle is held.
    Connected,
}

impl ConnectionStatus {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Resolved => "resolved",
            Self::Connected => "connected",
        }
    }

    /// Returns `true` once a backend implementation has been obtained.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved | Self::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
