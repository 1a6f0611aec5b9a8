//! Graph API version selection
//!
//! Requests address a pinned API version (`/v2.1/me`). Versions are
//! validated up front so a typo fails at client construction, not as a
//! confusing platform error on the first call.

use std::fmt;

use crate::error::{Error, Result};

/// API versions this client knows how to talk to.
pub const VALID_API_VERSIONS: &[&str] = &["1.0", "2.0", "2.1"];

/// Version used when the caller does not pin one.
pub const DEFAULT_VERSION: &str = "2.1";

/// A validated Graph API version. Displays in URL form (`v2.1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion(String);

impl ApiVersion {
    /// Validate a `<major>.<minor>` version string against the supported
    /// set. Both components are single digits, matching the platform's
    /// own version scheme.
    pub fn parse(version: &str) -> Result<Self> {
        let well_formed = matches!(
            version.as_bytes(),
            [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit()
        );
        if !well_formed {
            return Err(Error::InvalidVersion(format!(
                "version number should be in the #.# format, got {version:?}"
            )));
        }
        if !VALID_API_VERSIONS.contains(&version) {
            return Err(Error::InvalidVersion(format!(
                "valid API versions are {}",
                VALID_API_VERSIONS.join(", ")
            )));
        }
        Ok(Self(version.to_owned()))
    }

    /// The bare version number, e.g. `2.1`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self(DEFAULT_VERSION.to_owned())
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
