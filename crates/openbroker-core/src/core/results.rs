// crates/openbroker-core/src/core/results.rs
// ============================================================================
// Module: OpenBroker Operation Results
// Description: Result types returned by broker implementations.
// Purpose: Encode operation outcomes as closed, tagged states.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Broker results carry a state tag plus the fields meaningful for that state.
//! States are closed enums: a state string outside the enumeration fails to
//! decode instead of falling through to a default branch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Provision
// ============================================================================

/// Provisioning outcome reported by a broker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionState {
    /// Provisioning continues asynchronously.
    #[serde(rename = "is_async")]
    IsAsync,
    /// A new instance was created.
    #[default]
    #[serde(rename = "successfully created")]
    SuccessfulCreated,
    /// An instance with identical configuration already exists.
    #[serde(rename = "exists with identical config")]
    IdenticalAlreadyExists,
}

/// Result of a provision operation.
///
/// # Invariants
/// - `operation` is only meaningful when `state` is [`ProvisionState::IsAsync`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedServiceSpec {
    /// Provisioning outcome.
    #[serde(default)]
    pub state: ProvisionState,
    /// Dashboard URL for the instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Operation token for polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ProvisionedServiceSpec {
    /// Returns a result for a newly created instance.
    #[must_use]
    pub const fn created() -> Self {
        Self::with_state(ProvisionState::SuccessfulCreated)
    }

    /// Returns a result for an asynchronous provision.
    #[must_use]
    pub fn in_progress(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Self::with_state(ProvisionState::IsAsync)
        }
    }

    /// Returns a result for an identical existing instance.
    #[must_use]
    pub const fn identical() -> Self {
        Self::with_state(ProvisionState::IdenticalAlreadyExists)
    }

    /// Returns a result with the given state and no optional fields.
    #[must_use]
    pub const fn with_state(state: ProvisionState) -> Self {
        Self {
            state,
            dashboard_url: None,
            operation: None,
        }
    }

    /// Sets the dashboard URL.
    #[must_use]
    pub fn dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.dashboard_url = Some(url.into());
        self
    }

    /// Sets the operation token.
    #[must_use]
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Returns true when provisioning continues asynchronously.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.state == ProvisionState::IsAsync
    }
}

// ============================================================================
// SECTION: Update / Deprovision / Instance Fetch
// ============================================================================

/// Result of an update operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateServiceSpec {
    /// Whether the update continues asynchronously.
    #[serde(default)]
    pub is_async: bool,
    /// Operation token for polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Dashboard URL for the instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

/// Result of a deprovision operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprovisionServiceSpec {
    /// Whether deprovisioning continues asynchronously.
    pub is_async: bool,
    /// Operation token for polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Result of fetching a service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInstanceDetailsSpec {
    /// Service identifier of the instance.
    pub service_id: String,
    /// Plan identifier of the instance.
    pub plan_id: String,
    /// Dashboard URL for the instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Parameters the instance was provisioned or updated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// Binding outcome reported by a broker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindState {
    /// Binding continues asynchronously.
    #[serde(rename = "is_async")]
    IsAsync,
    /// A new binding was created.
    #[default]
    #[serde(rename = "successfully created")]
    SuccessfulBound,
    /// A binding with identical configuration already exists.
    #[serde(rename = "exists with identical config")]
    IdenticalAlreadyExists,
}

/// Shared device of a volume mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedDevice {
    /// Volume identifier.
    pub volume_id: String,
    /// Driver-specific mount configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_config: Option<Map<String, Value>>,
}

/// Volume mount returned by a binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Volume driver name.
    pub driver: String,
    /// Mount path inside the container.
    pub container_dir: String,
    /// Access mode (`r` or `rw`).
    pub mode: String,
    /// Device type label.
    pub device_type: String,
    /// Device description.
    pub device: SharedDevice,
}

/// Result of a bind operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Binding outcome.
    #[serde(default)]
    pub state: BindState,
    /// Credentials handed to the bound application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    /// Syslog drain URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
    /// Route service URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_service_url: Option<String>,
    /// Volume mounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<VolumeMount>>,
    /// Operation token for polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Result of fetching a binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetBindingSpec {
    /// Credentials handed to the bound application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    /// Syslog drain URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
    /// Route service URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_service_url: Option<String>,
    /// Volume mounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<VolumeMount>>,
    /// Parameters the binding was created with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

/// Result of an unbind operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbindSpec {
    /// Whether unbinding continues asynchronously.
    pub is_async: bool,
    /// Operation token for polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

// ============================================================================
// SECTION: Last Operation
// ============================================================================

/// State of an asynchronous operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    /// Operation still running.
    #[serde(rename = "in progress")]
    InProgress,
    /// Operation finished successfully.
    #[serde(rename = "succeeded")]
    Succeeded,
    /// Operation failed.
    #[serde(rename = "failed")]
    Failed,
}

/// Result of polling an asynchronous operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOperation {
    /// Operation state.
    pub state: OperationState,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
