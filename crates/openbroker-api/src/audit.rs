// crates/openbroker-api/src/audit.rs
// ============================================================================
// Module: OpenBroker Audit Logging
// Description: Structured audit events for broker request handling.
// Purpose: Emit one JSON line per request without touching response behavior.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events record what was asked and how it ended: operation, instance,
//! status, and error kind. Request bodies are never logged because
//! `parameters` and `context` may carry secrets.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Coarse request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerOutcome {
    /// Request succeeded.
    Ok,
    /// Request was rejected by validation or by the broker.
    Rejected,
    /// Request failed inside the broker or server.
    Failed,
}

/// Broker request audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Broker operation label.
    pub operation: &'static str,
    /// Instance identifier when the route carries one.
    pub instance_id: Option<String>,
    /// Whether the client accepts asynchronous operations.
    pub accepts_incomplete: bool,
    /// Declared `X-Broker-Api-Version`.
    pub api_version: Option<String>,
    /// HTTP status code returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: BrokerOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Inputs required to construct an audit event.
pub struct BrokerAuditEventParams {
    /// Broker operation label.
    pub operation: &'static str,
    /// Instance identifier when the route carries one.
    pub instance_id: Option<String>,
    /// Whether the client accepts asynchronous operations.
    pub accepts_incomplete: bool,
    /// Declared `X-Broker-Api-Version`.
    pub api_version: Option<String>,
    /// HTTP status code returned.
    pub status: u16,
    /// Request outcome.
    pub outcome: BrokerOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl BrokerAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: BrokerAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "broker_request",
            timestamp_ms,
            operation: params.operation,
            instance_id: params.instance_id,
            accepts_incomplete: params.accepts_incomplete,
            api_version: params.api_version,
            status: params.status,
            outcome: params.outcome,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for broker request events.
pub trait BrokerAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &BrokerAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl BrokerAuditSink for StderrAuditSink {
    fn record(&self, event: &BrokerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl BrokerAuditSink for FileAuditSink {
    fn record(&self, event: &BrokerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl BrokerAuditSink for NoopAuditSink {
    fn record(&self, _event: &BrokerAuditEvent) {}
}
