// crates/openbroker-core/src/runtime/mod.rs
// ============================================================================
// Module: OpenBroker Runtime
// Description: Request handlers, response mapping, routing, and reference broker.
// Purpose: Drive broker implementations and translate outcomes into responses.
// Dependencies: crate::{core, interfaces}, serde_json, tracing
// ============================================================================

//! ## Overview
//! Runtime modules implement the validate, delegate, and map pipeline for
//! broker requests. Transports hand raw request parts to [`BrokerHandler`]
//! and receive a transport-agnostic [`ApiResponse`] back.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod handler;
pub mod memory;
pub mod policy;
pub mod response;
pub mod router;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use handler::BrokerHandler;
pub use handler::InboundProvision;
pub use handler::InboundUpdate;
pub use handler::parse_accepts_incomplete;
pub use memory::ASYNC_REQUIRED_FLAG;
pub use memory::InMemoryBroker;
pub use policy::ApiVersion;
pub use policy::HandlerPolicy;
pub use policy::VersionParseError;
pub use response::ApiError;
pub use response::ApiResponse;
pub use response::ResponseStatus;
pub use router::BrokerRouter;
pub use router::BrokerRouterBuilder;
pub use router::RouterError;
