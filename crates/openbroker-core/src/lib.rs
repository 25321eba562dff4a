// crates/openbroker-core/src/lib.rs
// ============================================================================
// Module: OpenBroker Core Library
// Description: Public API surface for the OpenBroker provisioning core.
// Purpose: Expose catalog types, the broker contract, and request handlers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! OpenBroker core implements the provisioning lifecycle of the Open Service
//! Broker API: request validation, catalog lookup, broker invocation, and the
//! mapping of broker outcomes onto protocol status codes. It is transport
//! agnostic; HTTP wiring lives in `openbroker-api`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::BrokerError;
pub use interfaces::BrokerOperation;
pub use interfaces::ServiceBroker;
pub use runtime::ApiError;
pub use runtime::ApiResponse;
pub use runtime::ApiVersion;
pub use runtime::BrokerHandler;
pub use runtime::BrokerRouter;
pub use runtime::BrokerRouterBuilder;
pub use runtime::HandlerPolicy;
pub use runtime::InMemoryBroker;
pub use runtime::InboundProvision;
pub use runtime::InboundUpdate;
pub use runtime::ResponseStatus;
