// crates/openbroker-core/src/core/catalog.rs
// ============================================================================
// Module: OpenBroker Catalog
// Description: Declarative service and plan catalog plus plan lookup.
// Purpose: Describe what a broker offers and answer plan existence queries.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The catalog is immutable configuration data: a broker declares one service
//! or an ordered list of services, each with its plans. [`Catalog`] normalizes
//! the singular and sequence forms so lookups never care which one a broker
//! returned.
//!
//! Invariants:
//! - Plan ids are unique within a service. This module relies on the
//!   assumption and does not enforce it.
//! - Lookups are pure and never fail; absence is reported as `false`/`None`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Service Types
// ============================================================================

/// Service offered by a broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Service identifier.
    pub id: String,
    /// CLI-friendly service name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether instances of the service can be bound.
    pub bindable: bool,
    /// Plans offered for the service.
    pub plans: Vec<ServicePlan>,
    /// Optional tags for platform filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Optional platform permissions the service requires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Vec<String>>,
    /// Optional display metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ServiceMetadata>,
    /// Optional dashboard SSO client registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_client: Option<ServiceDashboardClient>,
    /// Whether instances may change plans on update.
    #[serde(default)]
    pub plan_updateable: bool,
    /// Whether instances can be fetched.
    #[serde(default)]
    pub instances_retrievable: bool,
    /// Whether bindings can be fetched.
    #[serde(default)]
    pub bindings_retrievable: bool,
    /// Additional platform- or broker-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Service {
    /// Creates a service with the required fields and no optional metadata.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        bindable: bool,
        plans: Vec<ServicePlan>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            bindable,
            plans,
            tags: None,
            requires: None,
            metadata: None,
            dashboard_client: None,
            plan_updateable: false,
            instances_retrievable: false,
            bindings_retrievable: false,
            extra: Map::new(),
        }
    }

    /// Returns the plan with the given id, if declared.
    #[must_use]
    pub fn plan(&self, plan_id: &str) -> Option<&ServicePlan> {
        self.plans.iter().find(|plan| plan.id == plan_id)
    }
}

/// Display metadata for a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    /// Display name.
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Image URL.
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Long description.
    #[serde(rename = "longDescription", default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Provider display name.
    #[serde(rename = "providerDisplayName", default, skip_serializing_if = "Option::is_none")]
    pub provider_display_name: Option<String>,
    /// Documentation URL.
    #[serde(rename = "documentationUrl", default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// Support URL.
    #[serde(rename = "supportUrl", default, skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,
    /// Whether instances may be shared across spaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shareable: Option<bool>,
    /// Additional metadata fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dashboard SSO client registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDashboardClient {
    /// OAuth client identifier.
    pub id: String,
    /// OAuth client secret.
    pub secret: String,
    /// Redirect URI for the dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

// ============================================================================
// SECTION: Plan Types
// ============================================================================

/// Plan offered for a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    /// Plan identifier, unique within its service.
    pub id: String,
    /// CLI-friendly plan name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Optional display and behavior metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ServicePlanMetadata>,
    /// Whether the plan is free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    /// Plan-level bindable override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindable: Option<bool>,
    /// Opaque JSON schemas for instance and binding parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Value>,
}

impl ServicePlan {
    /// Creates a plan with the required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            metadata: None,
            free: None,
            bindable: None,
            schemas: None,
        }
    }

    /// Returns a boolean flag from the plan metadata extension fields.
    #[must_use]
    pub fn metadata_flag(&self, key: &str) -> bool {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.extra.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Display metadata for a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePlanMetadata {
    /// Display name.
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Feature bullets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullets: Option<Vec<String>>,
    /// Plan costs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<Vec<ServicePlanCost>>,
    /// Additional metadata fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cost entry for a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePlanCost {
    /// Amount per currency code.
    pub amount: BTreeMap<String, f64>,
    /// Billing unit label.
    pub unit: String,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Catalog returned by a broker: a single service or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Catalog {
    /// Broker declares exactly one service.
    Single(Service),
    /// Broker declares an ordered list of services.
    Many(Vec<Service>),
}

impl Catalog {
    /// Returns an empty catalog.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Many(Vec::new())
    }

    /// Returns the services as an ordered slice.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        match self {
            Self::Single(service) => std::slice::from_ref(service),
            Self::Many(services) => services,
        }
    }

    /// Consumes the catalog, returning the ordered services.
    #[must_use]
    pub fn into_services(self) -> Vec<Service> {
        match self {
            Self::Single(service) => vec![service],
            Self::Many(services) => services,
        }
    }

    /// Returns the service with the given id, if declared.
    #[must_use]
    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services().iter().find(|service| service.id == service_id)
    }

    /// Returns true when any service declares a plan with the given id.
    #[must_use]
    pub fn plan_exists(&self, plan_id: &str) -> bool {
        plan_exists(self, plan_id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Service> for Catalog {
    fn from(service: Service) -> Self {
        Self::Single(service)
    }
}

impl From<Vec<Service>> for Catalog {
    fn from(services: Vec<Service>) -> Self {
        Self::Many(services)
    }
}

/// Returns true iff some plan of some service in `catalog` has id `plan_id`.
#[must_use]
pub fn plan_exists(catalog: &Catalog, plan_id: &str) -> bool {
    catalog.services().iter().flat_map(|service| service.plans.iter()).any(|plan| plan.id == plan_id)
}
