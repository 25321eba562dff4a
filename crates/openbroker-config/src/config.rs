// crates/openbroker-config/src/config.rs
// ============================================================================
// Module: OpenBroker Configuration
// Description: Configuration loading and validation for the broker server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: openbroker-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file is resolved from an explicit path, then `OPENBROKER_CONFIG`, then
//! `openbroker.toml` in the working directory. Unknown keys are rejected.
//!
//! The service catalog lives in a separate JSON file because it is served
//! verbatim on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use openbroker_core::ApiVersion;
use openbroker_core::Catalog;
use openbroker_core::HandlerPolicy;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "openbroker.toml";
/// Environment variable overriding the config path.
pub const CONFIG_ENV_VAR: &str = "OPENBROKER_CONFIG";
/// Maximum config file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum catalog file size in bytes.
const MAX_CATALOG_FILE_SIZE: usize = 4 * 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured credential pairs.
const MAX_CREDENTIALS: usize = 64;
/// Maximum length of a username or password.
const MAX_CREDENTIAL_LENGTH: usize = 256;
/// Upper bound for request bodies.
const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// OpenBroker server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenBrokerConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Protocol validation configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Catalog source configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl OpenBrokerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let content = read_limited(&resolved, MAX_CONFIG_FILE_SIZE, "config")?;
        let config: Self =
            toml::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.api.validate()?;
        self.catalog.validate()?;
        Ok(())
    }

    /// Returns the handler policy described by the `[api]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `api.min_version` is malformed.
    pub fn handler_policy(&self) -> Result<HandlerPolicy, ConfigError> {
        self.api.handler_policy()
    }

    /// Loads the configured catalog, or an empty catalog when none is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the catalog file cannot be read or parsed.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        self.catalog.load()
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Basic auth credential pairs accepted by the platform.
    #[serde(default)]
    pub credentials: Vec<BrokerCredentials>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            audit: AuditConfig::default(),
            credentials: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind address is malformed.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes must be at most {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        self.audit.validate()?;
        if self.credentials.len() > MAX_CREDENTIALS {
            return Err(ConfigError::Invalid(format!(
                "server.credentials exceeds {MAX_CREDENTIALS} entries"
            )));
        }
        for credentials in &self.credentials {
            credentials.validate()?;
        }
        Ok(())
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

/// Basic auth credential pair.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerCredentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BrokerCredentials {
    /// Validates a credential pair.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("username", &self.username), ("password", &self.password)] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "server.credentials.{field} must be non-empty"
                )));
            }
            if value.len() > MAX_CREDENTIAL_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "server.credentials.{field} exceeds max length"
                )));
            }
        }
        Ok(())
    }
}

/// Protocol validation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Reject requests whose `X-Broker-Api-Version` is missing or too low.
    #[serde(default)]
    pub check_version: bool,
    /// Minimum accepted version when `check_version` is enabled.
    #[serde(default = "default_min_version")]
    pub min_version: String,
    /// Require and cross-check org/space GUIDs on provision.
    #[serde(default)]
    pub check_org_space_guids: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            check_version: false,
            min_version: default_min_version(),
            check_org_space_guids: false,
        }
    }
}

impl ApiConfig {
    /// Returns the parsed minimum version.
    fn min_version(&self) -> Result<ApiVersion, ConfigError> {
        self.min_version.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "api.min_version must be major.minor, got {}",
                self.min_version
            ))
        })
    }

    /// Converts the section into a handler policy.
    fn handler_policy(&self) -> Result<HandlerPolicy, ConfigError> {
        let mut policy = HandlerPolicy::permissive();
        if self.check_version {
            policy = policy.with_min_api_version(self.min_version()?);
        }
        if self.check_org_space_guids {
            policy = policy.with_org_space_check();
        }
        Ok(policy)
    }

    /// Validates protocol configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.min_version()?;
        Ok(())
    }
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Path to a JSON catalog: one service object or a list of services.
    #[serde(default)]
    pub path: Option<String>,
}

impl CatalogConfig {
    /// Validates catalog configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("catalog.path", path)?;
        }
        Ok(())
    }

    /// Loads the catalog file.
    fn load(&self) -> Result<Catalog, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(Catalog::empty());
        };
        let content = read_limited(Path::new(path.trim()), MAX_CATALOG_FILE_SIZE, "catalog")?;
        serde_json::from_str(&content)
            .map_err(|err| ConfigError::Parse(format!("catalog {path}: {err}")))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML or JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Reads a UTF-8 file no larger than `limit` bytes.
fn read_limited(path: &Path, limit: usize, label: &str) -> Result<String, ConfigError> {
    let bytes = fs::read(path)
        .map_err(|err| ConfigError::Io(format!("{label} {}: {err}", path.display())))?;
    if bytes.len() > limit {
        return Err(ConfigError::Invalid(format!("{label} file exceeds size limit")));
    }
    String::from_utf8(bytes)
        .map_err(|_| ConfigError::Invalid(format!("{label} file must be utf-8")))
}

/// Default bind address.
fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

/// Default maximum request body size.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Audit logging is on unless disabled.
const fn default_audit_enabled() -> bool {
    true
}

/// Default minimum API version.
fn default_min_version() -> String {
    ApiVersion::MINIMUM.to_string()
}
