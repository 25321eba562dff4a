// crates/openbroker-api/src/lib.rs
// ============================================================================
// Module: OpenBroker API Library
// Description: HTTP routes and server for the OpenBroker core.
// Purpose: Expose catalog, provision, and update over the Open Service Broker API.
// Dependencies: axum, openbroker-config, openbroker-core, tokio
// ============================================================================

//! ## Overview
//! `openbroker-api` adapts HTTP requests to [`openbroker_core::BrokerHandler`]
//! and renders its responses. Every request produces one structured audit
//! event; audit output never changes response behavior.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod routes;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::BrokerAuditEvent;
pub use audit::BrokerAuditEventParams;
pub use audit::BrokerAuditSink;
pub use audit::BrokerOutcome;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use routes::RouterOptions;
pub use routes::broker_router;
pub use server::BrokerServer;
pub use server::ServerError;
