// crates/openbroker-core/src/core/details.rs
// ============================================================================
// Module: OpenBroker Request Details
// Description: Decoded request bodies for broker operations.
// Purpose: Carry platform-supplied request data to broker implementations.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Detail types are the typed form of inbound request bodies. They tolerate
//! fields they do not name: unknown keys are collected into `extra` and
//! passed through to the broker. `parameters`, `context` and
//! `previous_values` stay opaque JSON objects and are never coerced.

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

/// Details of a provision request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionDetails {
    /// Service identifier from the catalog.
    pub service_id: String,
    /// Plan identifier from the catalog.
    pub plan_id: String,
    /// Platform organization GUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_guid: Option<String>,
    /// Platform space GUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_guid: Option<String>,
    /// Opaque configuration parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    /// Opaque platform context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    /// Fields the protocol version in use does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProvisionDetails {
    /// Creates provision details with the required fields only.
    #[must_use]
    pub fn new(service_id: impl Into<String>, plan_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            plan_id: plan_id.into(),
            organization_guid: None,
            space_guid: None,
            parameters: None,
            context: None,
            extra: Map::new(),
        }
    }

    /// Returns a string value from the platform context.
    #[must_use]
    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.as_ref().and_then(|context| context.get(key)).and_then(Value::as_str)
    }

    /// Returns the organization GUID, falling back to the context value.
    #[must_use]
    pub fn effective_organization_guid(&self) -> Option<&str> {
        self.organization_guid.as_deref().or_else(|| self.context_str("organization_guid"))
    }

    /// Returns the space GUID, falling back to the context value.
    #[must_use]
    pub fn effective_space_guid(&self) -> Option<&str> {
        self.space_guid.as_deref().or_else(|| self.context_str("space_guid"))
    }
}

// ============================================================================
// SECTION: Update
// ============================================================================

/// Details of an update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDetails {
    /// Service identifier from the catalog.
    pub service_id: String,
    /// Target plan identifier; absent means no plan change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// Opaque configuration parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    /// Values of the instance before the update, as reported by the
    /// platform. Kept opaque so every reported value reaches the broker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_values: Option<Map<String, Value>>,
    /// Opaque platform context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    /// Fields the protocol version in use does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpdateDetails {
    /// Creates update details for a service without a plan change.
    #[must_use]
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            plan_id: None,
            parameters: None,
            previous_values: None,
            context: None,
            extra: Map::new(),
        }
    }

    /// Returns the requested plan id, treating an empty string as absent.
    #[must_use]
    pub fn requested_plan_id(&self) -> Option<&str> {
        self.plan_id.as_deref().filter(|plan_id| !plan_id.is_empty())
    }

    /// Returns a value the platform reported for the instance before the update.
    #[must_use]
    pub fn previous_value(&self, key: &str) -> Option<&Value> {
        self.previous_values.as_ref().and_then(|values| values.get(key))
    }

    /// Returns the previous plan id when the platform reported it as a string.
    #[must_use]
    pub fn previous_plan_id(&self) -> Option<&str> {
        self.previous_value("plan_id").and_then(Value::as_str)
    }
}

// ============================================================================
// SECTION: Deprovision / Bind / Unbind
// ============================================================================

/// Details of a deprovision request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprovisionDetails {
    /// Service identifier from the catalog.
    pub service_id: String,
    /// Plan identifier from the catalog.
    pub plan_id: String,
}

/// Resource a binding is created for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindResource {
    /// Application GUID for app bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    /// Route for route-service bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Fields the protocol version in use does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details of a bind request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindDetails {
    /// Service identifier from the catalog.
    pub service_id: String,
    /// Plan identifier from the catalog.
    pub plan_id: String,
    /// Deprecated application GUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    /// Resource the binding is created for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_resource: Option<BindResource>,
    /// Opaque configuration parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    /// Opaque platform context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    /// Fields the protocol version in use does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details of an unbind request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbindDetails {
    /// Service identifier from the catalog.
    pub service_id: String,
    /// Plan identifier from the catalog.
    pub plan_id: String,
}
