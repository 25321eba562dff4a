// crates/openbroker-api/src/routes.rs
// ============================================================================
// Module: OpenBroker HTTP Routes
// Description: Axum routes for catalog, provision, and update.
// Purpose: Translate HTTP requests into handler calls and render responses.
// Dependencies: axum, openbroker-config, openbroker-core, tokio, tracing
// ============================================================================

//! ## Overview
//! [`broker_router`] registers the broker routes on an axum [`Router`]:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/v2/catalog` | catalog |
//! | PUT | `/v2/service_instances/{instance_id}` | provision |
//! | PATCH | `/v2/service_instances/{instance_id}` | update |
//!
//! Broker calls are synchronous and may block, so they run under
//! `block_in_place` on multi-threaded runtimes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::put;
use openbroker_config::BrokerCredentials;
use openbroker_core::ApiError;
use openbroker_core::ApiResponse;
use openbroker_core::BrokerHandler;
use openbroker_core::BrokerOperation;
use openbroker_core::HandlerPolicy;
use openbroker_core::InboundProvision;
use openbroker_core::InboundUpdate;
use openbroker_core::InstanceId;
use openbroker_core::ServiceBroker;
use openbroker_core::runtime::parse_accepts_incomplete;
use openbroker_core::runtime::policy::API_VERSION_HEADER;
use tracing::warn;

use crate::audit::BrokerAuditEvent;
use crate::audit::BrokerAuditEventParams;
use crate::audit::BrokerAuditSink;
use crate::audit::BrokerOutcome;
use crate::audit::NoopAuditSink;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Options for [`broker_router`].
pub struct RouterOptions {
    /// Basic auth credentials configured for the broker. They are not
    /// enforced by these routes.
    pub credentials: Vec<BrokerCredentials>,
    /// Validation policy for the request handler.
    pub policy: HandlerPolicy,
    /// Audit sink receiving one event per request.
    pub audit: Arc<dyn BrokerAuditSink>,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            credentials: Vec::new(),
            policy: HandlerPolicy::default(),
            audit: Arc::new(NoopAuditSink),
            max_body_bytes: 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the broker routes for a broker implementation.
pub fn broker_router(broker: Arc<dyn ServiceBroker>, options: RouterOptions) -> Router {
    if !options.credentials.is_empty() {
        warn!(
            credentials = options.credentials.len(),
            "basic auth credentials are configured but not enforced"
        );
    }
    let state = Arc::new(ApiState {
        handler: BrokerHandler::new(broker, options.policy),
        audit: options.audit,
    });
    Router::new()
        .route("/v2/catalog", get(get_catalog))
        .route("/v2/service_instances/{instance_id}", put(provision_instance).patch(update_instance))
        .layer(DefaultBodyLimit::max(options.max_body_bytes))
        .with_state(state)
}

/// Shared state for route handlers.
struct ApiState {
    /// Request handler bound to the broker.
    handler: BrokerHandler,
    /// Audit sink.
    audit: Arc<dyn BrokerAuditSink>,
}

/// Request attributes recorded in the audit event.
struct AuditContext<'a> {
    /// Broker operation.
    operation: BrokerOperation,
    /// Instance identifier when present.
    instance_id: Option<&'a InstanceId>,
    /// Parsed `accepts_incomplete` flag.
    accepts_incomplete: bool,
    /// Declared API version.
    api_version: Option<&'a str>,
    /// Request body size in bytes.
    request_bytes: usize,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `GET /v2/catalog`.
async fn get_catalog(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> Response {
    let api_version = header_str(&headers, API_VERSION_HEADER);
    let result = call_with_blocking(|| state.handler.catalog(api_version));
    state.respond(
        &AuditContext {
            operation: BrokerOperation::Catalog,
            instance_id: None,
            accepts_incomplete: false,
            api_version,
            request_bytes: 0,
        },
        result,
    )
}

/// Handles `PUT /v2/service_instances/{instance_id}`.
async fn provision_instance(
    State(state): State<Arc<ApiState>>,
    Path(instance_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let instance_id = InstanceId::new(instance_id);
    let api_version = header_str(&headers, API_VERSION_HEADER);
    let accepts_incomplete = accepts_incomplete_from(&uri);
    let accepts_flag = accepts_incomplete.as_ref().is_ok_and(|flag| *flag);
    let result = accepts_incomplete.and_then(|accepts_incomplete| {
        let request = InboundProvision {
            instance_id: &instance_id,
            content_type: header_str(&headers, CONTENT_TYPE.as_str()),
            api_version,
            accepts_incomplete,
            body: &body,
        };
        call_with_blocking(|| state.handler.provision(&request))
    });
    state.respond(
        &AuditContext {
            operation: BrokerOperation::Provision,
            instance_id: Some(&instance_id),
            accepts_incomplete: accepts_flag,
            api_version,
            request_bytes: body.len(),
        },
        result,
    )
}

/// Handles `PATCH /v2/service_instances/{instance_id}`.
async fn update_instance(
    State(state): State<Arc<ApiState>>,
    Path(instance_id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let instance_id = InstanceId::new(instance_id);
    let api_version = header_str(&headers, API_VERSION_HEADER);
    let accepts_incomplete = accepts_incomplete_from(&uri);
    let accepts_flag = accepts_incomplete.as_ref().is_ok_and(|flag| *flag);
    let result = accepts_incomplete.and_then(|accepts_incomplete| {
        let request = InboundUpdate {
            instance_id: &instance_id,
            api_version,
            accepts_incomplete,
            body: &body,
        };
        call_with_blocking(|| state.handler.update(&request))
    });
    state.respond(
        &AuditContext {
            operation: BrokerOperation::Update,
            instance_id: Some(&instance_id),
            accepts_incomplete: accepts_flag,
            api_version,
            request_bytes: body.len(),
        },
        result,
    )
}

impl ApiState {
    /// Renders a handler result and records the audit event.
    fn respond(&self, context: &AuditContext<'_>, result: Result<ApiResponse, ApiError>) -> Response {
        let (response, outcome, error_kind) = match result {
            Ok(response) => (response, BrokerOutcome::Ok, None),
            Err(err) => {
                let outcome =
                    if err.is_internal() { BrokerOutcome::Failed } else { BrokerOutcome::Rejected };
                (err.to_response(), outcome, Some(err.kind()))
            }
        };
        let payload = serde_json::to_vec(&response.body).unwrap_or_else(|_| b"{}".to_vec());
        self.audit.record(&BrokerAuditEvent::new(BrokerAuditEventParams {
            operation: context.operation.as_str(),
            instance_id: context.instance_id.map(ToString::to_string),
            accepts_incomplete: context.accepts_incomplete,
            api_version: context.api_version.map(str::to_string),
            status: response.status.code(),
            outcome,
            error_kind,
            request_bytes: context.request_bytes,
            response_bytes: payload.len(),
        }));
        let status = StatusCode::from_u16(response.status.code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], payload)
            .into_response()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a header value as a string when present and visible ASCII.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Reads `accepts_incomplete` from the request query string.
///
/// An undecodable query or a repeated key is rejected like any other invalid
/// value so the client receives the JSON error body.
fn accepts_incomplete_from(uri: &Uri) -> Result<bool, ApiError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|err| ApiError::InvalidParameters(format!("invalid query string: {err}")))?;
    let mut values = pairs
        .iter()
        .filter(|(key, _)| key == "accepts_incomplete")
        .map(|(_, value)| value.as_str());
    let value = values.next();
    if values.next().is_some() {
        return Err(ApiError::InvalidParameters(
            "accepts_incomplete must appear at most once".to_string(),
        ));
    }
    parse_accepts_incomplete(value)
}

/// Executes a broker call, shifting to a blocking context when available.
fn call_with_blocking<T>(call: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(call)
        }
        _ => call(),
    }
}
