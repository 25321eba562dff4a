// crates/openbroker-api/src/server.rs
// ============================================================================
// Module: OpenBroker Server
// Description: HTTP server wiring for a configured broker.
// Purpose: Bind the broker routes to a TCP listener from configuration.
// Dependencies: axum, openbroker-config, openbroker-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`BrokerServer`] validates configuration once, builds the audit sink and
//! handler policy, and serves [`crate::broker_router`] over HTTP.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use openbroker_config::AuditConfig;
use openbroker_config::OpenBrokerConfig;
use openbroker_core::ServiceBroker;
use tracing::info;

use crate::audit::BrokerAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::routes::RouterOptions;
use crate::routes::broker_router;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Broker HTTP server.
pub struct BrokerServer {
    /// Listener address.
    addr: SocketAddr,
    /// Routes bound to the broker.
    app: Router,
}

impl BrokerServer {
    /// Builds a server for the broker from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or the audit
    /// sink cannot be opened.
    pub fn from_config(
        config: &OpenBrokerConfig,
        broker: Arc<dyn ServiceBroker>,
    ) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let addr = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let policy = config.handler_policy().map_err(|err| ServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config.server.audit)?;
        let app = broker_router(broker, RouterOptions {
            credentials: config.server.credentials.clone(),
            policy,
            audit,
            max_body_bytes: config.server.max_body_bytes,
        });
        Ok(Self {
            addr,
            app,
        })
    }

    /// Returns the configured listener address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves requests until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        info!(addr = %self.addr, "openbroker listening");
        axum::serve(listener, self.app)
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Builds the audit sink from configuration.
fn build_audit_sink(config: &AuditConfig) -> Result<Arc<dyn BrokerAuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path.trim()))
                .map_err(|err| ServerError::Init(format!("audit log {path}: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Broker server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
