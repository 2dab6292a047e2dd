//! SAML protocol versions.

use std::fmt;
use std::str::FromStr;

use crate::error::SamlError;

/// The SAML protocol versions this crate speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamlVersion {
    /// SAML 1.1.
    V1_1,
    /// SAML 2.0.
    #[default]
    V2_0,
}

impl SamlVersion {
    /// Major version number.
    #[must_use]
    pub const fn major(self) -> u8 {
        match self {
            Self::V1_1 => 1,
            Self::V2_0 => 2,
        }
    }

    /// Minor version number.
    #[must_use]
    pub const fn minor(self) -> u8 {
        match self {
            Self::V1_1 => 1,
            Self::V2_0 => 0,
        }
    }

    /// The `Version` attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_1 => "1.1",
            Self::V2_0 => "2.0",
        }
    }

    /// Extracts the major number from a `Version` attribute value.
    ///
    /// Returns `None` when the value is not `<digits>` or `<digits>.<digits>`.
    #[must_use]
    pub fn major_of(version: &str) -> Option<u8> {
        let mut parts = version.trim().splitn(2, '.');
        let major = parts.next()?.parse().ok()?;
        if let Some(minor) = parts.next() {
            minor.parse::<u8>().ok()?;
        }
        Some(major)
    }
}

impl fmt::Display for SamlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamlVersion {
    type Err = SamlError;

    /// Accepts `1.1`/`2.0` as well as the `saml11`/`saml20`/`saml2` names
    /// used in partner configuration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1.1" | "saml11" | "saml1.1" => Ok(Self::V1_1),
            "2.0" | "2" | "saml2" | "saml20" | "saml2.0" => Ok(Self::V2_0),
            other => Err(SamlError::UnsupportedVersion(other.to_string())),
        }
    }
}
