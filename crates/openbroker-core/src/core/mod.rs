// crates/openbroker-core/src/core/mod.rs
// ============================================================================
// Module: OpenBroker Core Types
// Description: Catalog, request detail, and result types of the broker protocol.
// Purpose: Group the wire-level data model shared by handlers and brokers.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types mirror the Open Service Broker wire model. Request details
//! tolerate unknown fields and carry them through unmodified; result types
//! use closed enums so every broker outcome maps to exactly one state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod details;
pub mod identifiers;
pub mod results;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Catalog;
pub use catalog::Service;
pub use catalog::ServiceDashboardClient;
pub use catalog::ServiceMetadata;
pub use catalog::ServicePlan;
pub use catalog::ServicePlanCost;
pub use catalog::ServicePlanMetadata;
pub use catalog::plan_exists;
pub use details::BindDetails;
pub use details::BindResource;
pub use details::DeprovisionDetails;
pub use details::ProvisionDetails;
pub use details::UnbindDetails;
pub use details::UpdateDetails;
pub use identifiers::BindingId;
pub use identifiers::InstanceId;
pub use results::BindState;
pub use results::Binding;
pub use results::DeprovisionServiceSpec;
pub use results::GetBindingSpec;
pub use results::GetInstanceDetailsSpec;
pub use results::LastOperation;
pub use results::OperationState;
pub use results::ProvisionState;
pub use results::ProvisionedServiceSpec;
pub use results::SharedDevice;
pub use results::UnbindSpec;
pub use results::UpdateServiceSpec;
pub use results::VolumeMount;
