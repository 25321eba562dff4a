// crates/openbroker-core/src/interfaces/mod.rs
// ============================================================================
// Module: OpenBroker Interfaces
// Description: Broker contract and the conditions a broker may signal.
// Purpose: Define the capability surface driven by the request handlers.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`ServiceBroker`] is the capability set a concrete broker exposes. Every
//! operation has a default body that fails with
//! [`BrokerError::NotImplemented`], so an incomplete broker is always
//! distinguishable from a broker that rejected the request.
//!
//! Brokers are called synchronously and may block. Callers running on an
//! async runtime are responsible for moving the call off the reactor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::BindDetails;
use crate::core::Binding;
use crate::core::BindingId;
use crate::core::Catalog;
use crate::core::DeprovisionDetails;
use crate::core::DeprovisionServiceSpec;
use crate::core::GetBindingSpec;
use crate::core::GetInstanceDetailsSpec;
use crate::core::InstanceId;
use crate::core::LastOperation;
use crate::core::ProvisionDetails;
use crate::core::ProvisionedServiceSpec;
use crate::core::UnbindDetails;
use crate::core::UnbindSpec;
use crate::core::UpdateDetails;
use crate::core::UpdateServiceSpec;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Broker operations named by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrokerOperation {
    /// Fetch the catalog.
    Catalog,
    /// Provision an instance.
    Provision,
    /// Update an instance.
    Update,
    /// Deprovision an instance.
    Deprovision,
    /// Create a binding.
    Bind,
    /// Delete a binding.
    Unbind,
    /// Fetch an instance.
    GetInstance,
    /// Fetch a binding.
    GetBinding,
    /// Poll an instance operation.
    LastOperation,
    /// Poll a binding operation.
    LastBindingOperation,
}

impl BrokerOperation {
    /// Returns the stable operation label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Provision => "provision",
            Self::Update => "update",
            Self::Deprovision => "deprovision",
            Self::Bind => "bind",
            Self::Unbind => "unbind",
            Self::GetInstance => "get_instance",
            Self::GetBinding => "get_binding",
            Self::LastOperation => "last_operation",
            Self::LastBindingOperation => "last_binding_operation",
        }
    }
}

impl fmt::Display for BrokerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Broker Conditions
// ============================================================================

/// Conditions a broker signals instead of returning a result.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// An instance with the same id but different configuration exists.
    #[error("service instance already exists")]
    InstanceAlreadyExists,
    /// The instance does not exist.
    #[error("service instance does not exist")]
    InstanceDoesNotExist,
    /// The plan requires asynchronous operations but the client did not accept them.
    #[error("asynchronous operation required")]
    AsyncRequired,
    /// Another operation on the same instance is in flight.
    #[error("concurrent access to the same service instance")]
    ConcurrentInstanceAccess,
    /// A binding with the same id but different configuration exists.
    #[error("service binding already exists")]
    BindingAlreadyExists,
    /// The binding does not exist.
    #[error("service binding does not exist")]
    BindingDoesNotExist,
    /// The binding requires an application GUID.
    #[error("app_guid required for binding")]
    AppGuidNotProvided,
    /// Parameters were rejected by the broker.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// The request was rejected by the broker.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The broker does not implement the operation.
    #[error("operation not implemented: {0}")]
    NotImplemented(BrokerOperation),
    /// The broker failed internally.
    #[error("broker failure: {0}")]
    Service(String),
}

impl BrokerError {
    /// Returns a stable label for logging and audit records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InstanceAlreadyExists => "instance_already_exists",
            Self::InstanceDoesNotExist => "instance_does_not_exist",
            Self::AsyncRequired => "async_required",
            Self::ConcurrentInstanceAccess => "concurrent_instance_access",
            Self::BindingAlreadyExists => "binding_already_exists",
            Self::BindingDoesNotExist => "binding_does_not_exist",
            Self::AppGuidNotProvided => "app_guid_not_provided",
            Self::InvalidParameters(_) => "invalid_parameters",
            Self::BadRequest(_) => "bad_request",
            Self::NotImplemented(_) => "not_implemented",
            Self::Service(_) => "service",
        }
    }
}

// ============================================================================
// SECTION: Broker Contract
// ============================================================================

/// Capability set of a concrete service broker.
///
/// Implementations override the operations they support. The remaining
/// operations fail with [`BrokerError::NotImplemented`].
pub trait ServiceBroker: Send + Sync {
    /// Returns the services and plans this broker offers.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the catalog cannot be produced.
    fn catalog(&self) -> Result<Catalog, BrokerError> {
        Err(BrokerError::NotImplemented(BrokerOperation::Catalog))
    }

    /// Provisions a service instance.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InstanceAlreadyExists`] for a conflicting
    /// instance and [`BrokerError::AsyncRequired`] when the plan cannot be
    /// provisioned synchronously and `async_allowed` is false.
    fn provision(
        &self,
        instance_id: &InstanceId,
        details: &ProvisionDetails,
        async_allowed: bool,
    ) -> Result<ProvisionedServiceSpec, BrokerError> {
        let _ = (instance_id, details, async_allowed);
        Err(BrokerError::NotImplemented(BrokerOperation::Provision))
    }

    /// Updates a service instance.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::AsyncRequired`] when the update cannot run
    /// synchronously and `async_allowed` is false.
    fn update(
        &self,
        instance_id: &InstanceId,
        details: &UpdateDetails,
        async_allowed: bool,
    ) -> Result<UpdateServiceSpec, BrokerError> {
        let _ = (instance_id, details, async_allowed);
        Err(BrokerError::NotImplemented(BrokerOperation::Update))
    }

    /// Deprovisions a service instance.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InstanceDoesNotExist`] for unknown instances.
    fn deprovision(
        &self,
        instance_id: &InstanceId,
        details: &DeprovisionDetails,
        async_allowed: bool,
    ) -> Result<DeprovisionServiceSpec, BrokerError> {
        let _ = (instance_id, details, async_allowed);
        Err(BrokerError::NotImplemented(BrokerOperation::Deprovision))
    }

    /// Creates a binding for a service instance.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::BindingAlreadyExists`] for a conflicting binding.
    fn bind(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
        details: &BindDetails,
        async_allowed: bool,
    ) -> Result<Binding, BrokerError> {
        let _ = (instance_id, binding_id, details, async_allowed);
        Err(BrokerError::NotImplemented(BrokerOperation::Bind))
    }

    /// Deletes a binding.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::BindingDoesNotExist`] for unknown bindings.
    fn unbind(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
        details: &UnbindDetails,
        async_allowed: bool,
    ) -> Result<UnbindSpec, BrokerError> {
        let _ = (instance_id, binding_id, details, async_allowed);
        Err(BrokerError::NotImplemented(BrokerOperation::Unbind))
    }

    /// Fetches a service instance.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InstanceDoesNotExist`] for unknown instances.
    fn get_instance(&self, instance_id: &InstanceId) -> Result<GetInstanceDetailsSpec, BrokerError> {
        let _ = instance_id;
        Err(BrokerError::NotImplemented(BrokerOperation::GetInstance))
    }

    /// Fetches a binding.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::BindingDoesNotExist`] for unknown bindings.
    fn get_binding(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
    ) -> Result<GetBindingSpec, BrokerError> {
        let _ = (instance_id, binding_id);
        Err(BrokerError::NotImplemented(BrokerOperation::GetBinding))
    }

    /// Polls the last operation on an instance.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InstanceDoesNotExist`] for unknown instances.
    fn last_operation(
        &self,
        instance_id: &InstanceId,
        operation: Option<&str>,
    ) -> Result<LastOperation, BrokerError> {
        let _ = (instance_id, operation);
        Err(BrokerError::NotImplemented(BrokerOperation::LastOperation))
    }

    /// Polls the last operation on a binding.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::BindingDoesNotExist`] for unknown bindings.
    fn last_binding_operation(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
        operation: Option<&str>,
    ) -> Result<LastOperation, BrokerError> {
        let _ = (instance_id, binding_id, operation);
        Err(BrokerError::NotImplemented(BrokerOperation::LastBindingOperation))
    }
}
