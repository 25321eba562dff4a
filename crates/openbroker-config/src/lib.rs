// crates/openbroker-config/src/lib.rs
// ============================================================================
// Module: OpenBroker Config Library
// Description: Configuration model and validation for the broker server.
// Purpose: Single source of truth for openbroker.toml semantics.
// Dependencies: openbroker-core, serde, toml
// ============================================================================

//! ## Overview
//! `openbroker-config` loads `openbroker.toml`, validates it with hard limits,
//! and converts it into the runtime types of `openbroker-core`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
