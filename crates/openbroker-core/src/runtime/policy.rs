// crates/openbroker-core/src/runtime/policy.rs
// ============================================================================
// Module: OpenBroker Handler Policy
// Description: Process-wide validation toggles applied by request handlers.
// Purpose: Carry version gating and org/space checks as explicit configuration.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`HandlerPolicy`] is fixed when a [`crate::BrokerHandler`] is constructed.
//! Both checks are disabled by default: the API version header is then only
//! logged, and org/space GUIDs are passed through without inspection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ============================================================================
// SECTION: API Version
// ============================================================================

/// Header carrying the client API version.
pub const API_VERSION_HEADER: &str = "X-Broker-Api-Version";

/// Broker API version as `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl ApiVersion {
    /// Lowest version accepted when version gating is enabled without an
    /// explicit minimum.
    pub const MINIMUM: Self = Self::new(2, 13);

    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a version string is not `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid api version: {0}")]
pub struct VersionParseError(pub String);

impl FromStr for ApiVersion {
    type Err = VersionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (major, minor) =
            trimmed.split_once('.').ok_or_else(|| VersionParseError(trimmed.to_string()))?;
        let major = major.parse().map_err(|_| VersionParseError(trimmed.to_string()))?;
        let minor = minor.parse().map_err(|_| VersionParseError(trimmed.to_string()))?;
        Ok(Self::new(major, minor))
    }
}

// ============================================================================
// SECTION: Handler Policy
// ============================================================================

/// Validation toggles for request handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerPolicy {
    /// Minimum accepted API version; `None` disables version gating.
    pub min_api_version: Option<ApiVersion>,
    /// Require org and space GUIDs on provision and cross-check them
    /// against the platform context.
    pub check_org_space_guids: bool,
}

impl HandlerPolicy {
    /// Returns a policy with every check disabled.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            min_api_version: None,
            check_org_space_guids: false,
        }
    }

    /// Enables version gating with the given minimum.
    #[must_use]
    pub const fn with_min_api_version(mut self, version: ApiVersion) -> Self {
        self.min_api_version = Some(version);
        self
    }

    /// Enables the org/space GUID check.
    #[must_use]
    pub const fn with_org_space_check(mut self) -> Self {
        self.check_org_space_guids = true;
        self
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
