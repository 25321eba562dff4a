// crates/openbroker-core/tests/common/mod.rs
// ============================================================================
// Module: Broker Test Fixtures
// Description: Shared catalogs and a recording broker for handler tests.
// Purpose: Observe exactly which broker calls a handler makes.
// ============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Fixtures are shared across test binaries that use different subsets."
)]

use std::sync::Arc;
use std::sync::Mutex;

use openbroker_core::BrokerError;
use openbroker_core::BrokerHandler;
use openbroker_core::Catalog;
use openbroker_core::HandlerPolicy;
use openbroker_core::InstanceId;
use openbroker_core::ProvisionDetails;
use openbroker_core::ProvisionedServiceSpec;
use openbroker_core::Service;
use openbroker_core::ServiceBroker;
use openbroker_core::ServicePlan;
use openbroker_core::UpdateDetails;
use openbroker_core::UpdateServiceSpec;

/// Call observed by [`RecordingBroker`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Catalog,
    Provision {
        instance_id: InstanceId,
        details: ProvisionDetails,
        async_allowed: bool,
    },
    Update {
        instance_id: InstanceId,
        details: UpdateDetails,
        async_allowed: bool,
    },
}

/// Broker returning canned results and recording every call.
pub struct RecordingBroker {
    pub catalog: Catalog,
    pub provision_result: Result<ProvisionedServiceSpec, BrokerError>,
    pub update_result: Result<UpdateServiceSpec, BrokerError>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBroker {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            provision_result: Ok(ProvisionedServiceSpec::created()),
            update_result: Ok(UpdateServiceSpec::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_provision(mut self, result: Result<ProvisionedServiceSpec, BrokerError>) -> Self {
        self.provision_result = result;
        self
    }

    pub fn with_update(mut self, result: Result<UpdateServiceSpec, BrokerError>) -> Self {
        self.update_result = result;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the calls other than catalog lookups.
    pub fn mutations(&self) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|call| *call != RecordedCall::Catalog).collect()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ServiceBroker for RecordingBroker {
    fn catalog(&self) -> Result<Catalog, BrokerError> {
        self.record(RecordedCall::Catalog);
        Ok(self.catalog.clone())
    }

    fn provision(
        &self,
        instance_id: &InstanceId,
        details: &ProvisionDetails,
        async_allowed: bool,
    ) -> Result<ProvisionedServiceSpec, BrokerError> {
        self.record(RecordedCall::Provision {
            instance_id: instance_id.clone(),
            details: details.clone(),
            async_allowed,
        });
        self.provision_result.clone()
    }

    fn update(
        &self,
        instance_id: &InstanceId,
        details: &UpdateDetails,
        async_allowed: bool,
    ) -> Result<UpdateServiceSpec, BrokerError> {
        self.record(RecordedCall::Update {
            instance_id: instance_id.clone(),
            details: details.clone(),
            async_allowed,
        });
        self.update_result.clone()
    }
}

/// Single service `s1` with plans `p1` and `p2`.
pub fn sample_service() -> Service {
    Service::new(
        "s1",
        "sample",
        "Sample service",
        true,
        vec![ServicePlan::new("p1", "small", "Small plan"), ServicePlan::new("p2", "large", "Large plan")],
    )
}

pub fn sample_catalog() -> Catalog {
    Catalog::Single(sample_service())
}

/// Builds a handler over a shared recording broker.
pub fn handler_for(broker: &Arc<RecordingBroker>, policy: HandlerPolicy) -> BrokerHandler {
    BrokerHandler::new(Arc::clone(broker) as Arc<dyn ServiceBroker>, policy)
}
