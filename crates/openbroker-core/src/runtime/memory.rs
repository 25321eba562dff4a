// crates/openbroker-core/src/runtime/memory.rs
// ============================================================================
// Module: OpenBroker In-Memory Broker
// Description: Reference broker keeping instance records in process memory.
// Purpose: Back the CLI server and tests with a working broker implementation.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemoryBroker`] serves a fixed catalog and records provisioned
//! instances in a mutex-guarded map. Repeating a provision whose service,
//! plan, and parameters match the instance's current state is idempotent;
//! any other request for the same id conflicts. Context, GUIDs, and unnamed
//! fields do not take part in the comparison.
//!
//! A plan whose metadata sets `"async_required": true` is only provisioned
//! or updated when the client accepts asynchronous operations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde_json::Map;
use serde_json::Value;

use crate::core::Catalog;
use crate::core::DeprovisionDetails;
use crate::core::DeprovisionServiceSpec;
use crate::core::GetInstanceDetailsSpec;
use crate::core::InstanceId;
use crate::core::LastOperation;
use crate::core::OperationState;
use crate::core::ProvisionDetails;
use crate::core::ProvisionedServiceSpec;
use crate::core::Service;
use crate::core::ServicePlan;
use crate::core::UpdateDetails;
use crate::core::UpdateServiceSpec;
use crate::interfaces::BrokerError;
use crate::interfaces::ServiceBroker;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Plan metadata flag marking plans that only run asynchronously.
pub const ASYNC_REQUIRED_FLAG: &str = "async_required";

// ============================================================================
// SECTION: Records
// ============================================================================

/// Stored state of a provisioned instance.
#[derive(Debug, Clone)]
struct InstanceRecord {
    /// Service the instance belongs to.
    service_id: String,
    /// Current plan identifier.
    plan_id: String,
    /// Current parameters.
    parameters: Option<Map<String, Value>>,
    /// Operation token of the last asynchronous operation.
    operation: Option<String>,
}

impl InstanceRecord {
    /// Returns true when a provision request matches the instance's current
    /// service, plan, and parameters.
    fn matches(&self, details: &ProvisionDetails) -> bool {
        self.service_id == details.service_id
            && self.plan_id == details.plan_id
            && self.parameters == details.parameters
    }
}

// ============================================================================
// SECTION: Broker
// ============================================================================

/// Broker storing instances in memory.
#[derive(Debug, Clone)]
pub struct InMemoryBroker {
    /// Catalog served by the broker.
    catalog: Catalog,
    /// Base URL for instance dashboards.
    dashboard_base: Option<String>,
    /// Instance records keyed by id.
    instances: Arc<Mutex<BTreeMap<InstanceId, InstanceRecord>>>,
}

impl InMemoryBroker {
    /// Creates a broker serving the given catalog.
    #[must_use]
    pub fn new(catalog: impl Into<Catalog>) -> Self {
        Self {
            catalog: catalog.into(),
            dashboard_base: None,
            instances: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Sets the base URL used to build instance dashboard URLs.
    #[must_use]
    pub fn with_dashboard_base(mut self, base: impl Into<String>) -> Self {
        self.dashboard_base = Some(base.into());
        self
    }

    /// Returns the number of stored instances.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Service`] when the instance store is poisoned.
    pub fn instance_count(&self) -> Result<usize, BrokerError> {
        Ok(self.lock()?.len())
    }

    /// Locks the instance store.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<InstanceId, InstanceRecord>>, BrokerError> {
        self.instances
            .lock()
            .map_err(|_| BrokerError::Service("instance store mutex poisoned".to_string()))
    }

    /// Resolves a service and plan from the catalog.
    fn resolve(&self, service_id: &str, plan_id: &str) -> Result<(&Service, &ServicePlan), BrokerError> {
        let service = self
            .catalog
            .service(service_id)
            .ok_or_else(|| BrokerError::BadRequest(format!("service_id {service_id} not found.")))?;
        let plan = service
            .plan(plan_id)
            .ok_or_else(|| BrokerError::BadRequest(format!("plan_id {plan_id} not found.")))?;
        Ok((service, plan))
    }

    /// Returns the dashboard URL for an instance.
    fn dashboard_url(&self, instance_id: &InstanceId) -> Option<String> {
        self.dashboard_base
            .as_deref()
            .map(|base| format!("{}/{instance_id}", base.trim_end_matches('/')))
    }
}

impl ServiceBroker for InMemoryBroker {
    fn catalog(&self) -> Result<Catalog, BrokerError> {
        Ok(self.catalog.clone())
    }

    fn provision(
        &self,
        instance_id: &InstanceId,
        details: &ProvisionDetails,
        async_allowed: bool,
    ) -> Result<ProvisionedServiceSpec, BrokerError> {
        let (_, plan) = self.resolve(&details.service_id, &details.plan_id)?;
        let mut instances = self.lock()?;
        if let Some(existing) = instances.get(instance_id) {
            if !existing.matches(details) {
                return Err(BrokerError::InstanceAlreadyExists);
            }
            let mut spec = ProvisionedServiceSpec::identical();
            spec.dashboard_url = self.dashboard_url(instance_id);
            return Ok(spec);
        }

        let async_plan = plan.metadata_flag(ASYNC_REQUIRED_FLAG);
        if async_plan && !async_allowed {
            return Err(BrokerError::AsyncRequired);
        }
        let operation = async_plan.then(|| format!("provision-{instance_id}"));
        instances.insert(instance_id.clone(), InstanceRecord {
            service_id: details.service_id.clone(),
            plan_id: details.plan_id.clone(),
            parameters: details.parameters.clone(),
            operation: operation.clone(),
        });

        let mut spec = match operation {
            Some(operation) => ProvisionedServiceSpec::in_progress(operation),
            None => ProvisionedServiceSpec::created(),
        };
        spec.dashboard_url = self.dashboard_url(instance_id);
        Ok(spec)
    }

    fn update(
        &self,
        instance_id: &InstanceId,
        details: &UpdateDetails,
        async_allowed: bool,
    ) -> Result<UpdateServiceSpec, BrokerError> {
        let mut instances = self.lock()?;
        let record = instances.get_mut(instance_id).ok_or(BrokerError::InstanceDoesNotExist)?;
        if record.service_id != details.service_id {
            return Err(BrokerError::BadRequest(format!(
                "service_id {} does not match instance.",
                details.service_id
            )));
        }
        let target_plan = details.requested_plan_id().unwrap_or(record.plan_id.as_str());
        let (service, plan) = self.resolve(&details.service_id, target_plan)?;
        if plan.id != record.plan_id && !service.plan_updateable {
            return Err(BrokerError::BadRequest(format!(
                "service {} does not support plan changes.",
                service.id
            )));
        }

        let async_plan = plan.metadata_flag(ASYNC_REQUIRED_FLAG);
        if async_plan && !async_allowed {
            return Err(BrokerError::AsyncRequired);
        }
        let operation = async_plan.then(|| format!("update-{instance_id}"));
        record.plan_id.clone_from(&plan.id);
        if details.parameters.is_some() {
            record.parameters.clone_from(&details.parameters);
        }
        record.operation.clone_from(&operation);
        Ok(UpdateServiceSpec {
            is_async: async_plan,
            operation,
            dashboard_url: self.dashboard_url(instance_id),
        })
    }

    fn deprovision(
        &self,
        instance_id: &InstanceId,
        details: &DeprovisionDetails,
        async_allowed: bool,
    ) -> Result<DeprovisionServiceSpec, BrokerError> {
        let _ = (details, async_allowed);
        let mut instances = self.lock()?;
        instances.remove(instance_id).ok_or(BrokerError::InstanceDoesNotExist)?;
        Ok(DeprovisionServiceSpec::default())
    }

    fn get_instance(&self, instance_id: &InstanceId) -> Result<GetInstanceDetailsSpec, BrokerError> {
        let instances = self.lock()?;
        let record = instances.get(instance_id).ok_or(BrokerError::InstanceDoesNotExist)?;
        Ok(GetInstanceDetailsSpec {
            service_id: record.service_id.clone(),
            plan_id: record.plan_id.clone(),
            dashboard_url: self.dashboard_url(instance_id),
            parameters: record.parameters.clone(),
        })
    }

    fn last_operation(
        &self,
        instance_id: &InstanceId,
        operation: Option<&str>,
    ) -> Result<LastOperation, BrokerError> {
        let instances = self.lock()?;
        let record = instances.get(instance_id).ok_or(BrokerError::InstanceDoesNotExist)?;
        let description = match (operation, record.operation.as_deref()) {
            (Some(requested), Some(current)) if requested != current => {
                return Err(BrokerError::BadRequest(format!("unknown operation {requested}.")));
            }
            (_, Some(current)) => Some(format!("{current} completed")),
            (_, None) => None,
        };
        Ok(LastOperation {
            state: OperationState::Succeeded,
            description,
        })
    }
}
