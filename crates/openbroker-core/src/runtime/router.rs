// crates/openbroker-core/src/runtime/router.rs
// ============================================================================
// Module: OpenBroker Composite Router
// Description: Broker that dispatches to registered brokers by service id.
// Purpose: Serve several single-service brokers behind one catalog.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! [`BrokerRouter`] implements [`ServiceBroker`] by concatenating the catalogs
//! of its registered brokers and forwarding each operation to the broker that
//! declares the request's `service_id`. Catalogs are captured once at build
//! time; the service index never changes afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::core::BindDetails;
use crate::core::Binding;
use crate::core::BindingId;
use crate::core::Catalog;
use crate::core::DeprovisionDetails;
use crate::core::DeprovisionServiceSpec;
use crate::core::InstanceId;
use crate::core::ProvisionDetails;
use crate::core::ProvisionedServiceSpec;
use crate::core::Service;
use crate::core::UnbindDetails;
use crate::core::UnbindSpec;
use crate::core::UpdateDetails;
use crate::core::UpdateServiceSpec;
use crate::interfaces::BrokerError;
use crate::interfaces::ServiceBroker;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned while building a router.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Two registered brokers declare the same service id.
    #[error("duplicate service id: {0}")]
    DuplicateService(String),
    /// A registered broker could not produce its catalog.
    #[error("broker catalog unavailable: {0}")]
    Catalog(#[from] BrokerError),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a composite broker router.
#[derive(Default)]
pub struct BrokerRouterBuilder {
    /// Brokers in registration order.
    brokers: Vec<Arc<dyn ServiceBroker>>,
}

impl BrokerRouterBuilder {
    /// Registers a broker.
    #[must_use]
    pub fn broker(mut self, broker: impl ServiceBroker + 'static) -> Self {
        self.brokers.push(Arc::new(broker));
        self
    }

    /// Registers a shared broker.
    #[must_use]
    pub fn shared(mut self, broker: Arc<dyn ServiceBroker>) -> Self {
        self.brokers.push(broker);
        self
    }

    /// Builds the router, snapshotting each broker's catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateService`] when two brokers declare the
    /// same service and [`RouterError::Catalog`] when a catalog fails.
    pub fn build(self) -> Result<BrokerRouter, RouterError> {
        let mut services = Vec::new();
        let mut index = BTreeMap::new();
        for broker in self.brokers {
            for service in broker.catalog()?.into_services() {
                if index.insert(service.id.clone(), Arc::clone(&broker)).is_some() {
                    return Err(RouterError::DuplicateService(service.id));
                }
                services.push(service);
            }
        }
        Ok(BrokerRouter {
            services,
            index,
        })
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Composite broker dispatching by service id.
pub struct BrokerRouter {
    /// Concatenated catalog in registration order.
    services: Vec<Service>,
    /// Broker owning each service id.
    index: BTreeMap<String, Arc<dyn ServiceBroker>>,
}

impl BrokerRouter {
    /// Returns a builder for the router.
    #[must_use]
    pub fn builder() -> BrokerRouterBuilder {
        BrokerRouterBuilder::default()
    }

    /// Returns the broker that declares `service_id`.
    fn route(&self, service_id: &str) -> Result<&Arc<dyn ServiceBroker>, BrokerError> {
        self.index
            .get(service_id)
            .ok_or_else(|| BrokerError::BadRequest(format!("service_id {service_id} not found.")))
    }
}

impl ServiceBroker for BrokerRouter {
    fn catalog(&self) -> Result<Catalog, BrokerError> {
        Ok(Catalog::Many(self.services.clone()))
    }

    fn provision(
        &self,
        instance_id: &InstanceId,
        details: &ProvisionDetails,
        async_allowed: bool,
    ) -> Result<ProvisionedServiceSpec, BrokerError> {
        self.route(&details.service_id)?.provision(instance_id, details, async_allowed)
    }

    fn update(
        &self,
        instance_id: &InstanceId,
        details: &UpdateDetails,
        async_allowed: bool,
    ) -> Result<UpdateServiceSpec, BrokerError> {
        self.route(&details.service_id)?.update(instance_id, details, async_allowed)
    }

    fn deprovision(
        &self,
        instance_id: &InstanceId,
        details: &DeprovisionDetails,
        async_allowed: bool,
    ) -> Result<DeprovisionServiceSpec, BrokerError> {
        self.route(&details.service_id)?.deprovision(instance_id, details, async_allowed)
    }

    fn bind(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
        details: &BindDetails,
        async_allowed: bool,
    ) -> Result<Binding, BrokerError> {
        self.route(&details.service_id)?.bind(instance_id, binding_id, details, async_allowed)
    }

    fn unbind(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
        details: &UnbindDetails,
        async_allowed: bool,
    ) -> Result<UnbindSpec, BrokerError> {
        self.route(&details.service_id)?.unbind(instance_id, binding_id, details, async_allowed)
    }
}
