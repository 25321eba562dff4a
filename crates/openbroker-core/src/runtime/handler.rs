// crates/openbroker-core/src/runtime/handler.rs
// ============================================================================
// Module: OpenBroker Request Handler
// Description: Validate, delegate, and map pipeline for broker requests.
// Purpose: Drive a ServiceBroker for catalog, provision, and update requests.
// Dependencies: crate::{core, interfaces}, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`BrokerHandler`] receives raw request parts from a transport, validates
//! them in a fixed order, invokes the broker, and maps the outcome onto an
//! [`ApiResponse`]. Validation failures never reach the broker.
//!
//! Provision validation order:
//! 1. API version (only when gating is enabled)
//! 2. Content type must be `application/json`
//! 3. Body must decode into [`ProvisionDetails`]
//! 4. Org/space GUIDs (only when the check is enabled)
//! 5. `plan_id` must exist in the broker catalog
//!
//! Update follows the same order without the content type and org/space
//! steps, and skips the catalog check when no plan is requested.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::core::InstanceId;
use crate::core::ProvisionDetails;
use crate::core::ProvisionState;
use crate::core::UpdateDetails;
use crate::core::plan_exists;
use crate::interfaces::BrokerError;
use crate::interfaces::BrokerOperation;
use crate::interfaces::ServiceBroker;
use crate::runtime::policy::ApiVersion;
use crate::runtime::policy::HandlerPolicy;
use crate::runtime::response::ApiError;
use crate::runtime::response::ApiResponse;
use crate::runtime::response::CatalogResponse;
use crate::runtime::response::ProvisioningResponse;
use crate::runtime::response::ResponseStatus;
use crate::runtime::response::UpdateResponse;

// ============================================================================
// SECTION: Inbound Requests
// ============================================================================

/// Raw parts of a provision request.
#[derive(Debug, Clone, Copy)]
pub struct InboundProvision<'a> {
    /// Platform-assigned instance id.
    pub instance_id: &'a InstanceId,
    /// `Content-Type` header value.
    pub content_type: Option<&'a str>,
    /// `X-Broker-Api-Version` header value.
    pub api_version: Option<&'a str>,
    /// Whether the client accepts asynchronous provisioning.
    pub accepts_incomplete: bool,
    /// Raw JSON body.
    pub body: &'a [u8],
}

/// Raw parts of an update request.
#[derive(Debug, Clone, Copy)]
pub struct InboundUpdate<'a> {
    /// Platform-assigned instance id.
    pub instance_id: &'a InstanceId,
    /// `X-Broker-Api-Version` header value.
    pub api_version: Option<&'a str>,
    /// Whether the client accepts asynchronous updates.
    pub accepts_incomplete: bool,
    /// Raw JSON body.
    pub body: &'a [u8],
}

/// Parses the `accepts_incomplete` query parameter; absence means `false`.
///
/// # Errors
///
/// Returns [`ApiError::InvalidParameters`] for values that are not booleans.
pub fn parse_accepts_incomplete(value: Option<&str>) -> Result<bool, ApiError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ApiError::InvalidParameters(format!(
            "accepts_incomplete must be a boolean, got \"{other}\""
        ))),
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Request handler bound to one broker and policy.
#[derive(Clone)]
pub struct BrokerHandler {
    /// Broker implementation driven by the handler.
    broker: Arc<dyn ServiceBroker>,
    /// Validation policy.
    policy: HandlerPolicy,
}

impl BrokerHandler {
    /// Creates a handler for the broker.
    #[must_use]
    pub fn new(broker: Arc<dyn ServiceBroker>, policy: HandlerPolicy) -> Self {
        Self {
            broker,
            policy,
        }
    }

    /// Returns the validation policy.
    #[must_use]
    pub const fn policy(&self) -> HandlerPolicy {
        self.policy
    }

    /// Returns the broker catalog as `{services: [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when version gating rejects the request or the
    /// broker cannot produce a catalog.
    pub fn catalog(&self, api_version: Option<&str>) -> Result<ApiResponse, ApiError> {
        self.check_api_version(BrokerOperation::Catalog, api_version)?;
        let catalog = self.broker.catalog().map_err(|err| {
            broker_failure(BrokerOperation::Catalog, None, err)
        })?;
        ApiResponse::json(ResponseStatus::Ok, &CatalogResponse {
            services: catalog.into_services(),
        })
    }

    /// Handles a provision request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for rejected requests and broker conditions.
    pub fn provision(&self, request: &InboundProvision<'_>) -> Result<ApiResponse, ApiError> {
        self.check_api_version(BrokerOperation::Provision, request.api_version)?;
        if !is_json_content_type(request.content_type) {
            return Err(ApiError::ContentType);
        }
        let details: ProvisionDetails = decode_body(request.body)?;
        if self.policy.check_org_space_guids {
            check_org_space_guids(&details)?;
        }
        self.ensure_plan_exists(&details.plan_id)?;

        let spec = self
            .broker
            .provision(request.instance_id, &details, request.accepts_incomplete)
            .map_err(|err| {
                broker_failure(BrokerOperation::Provision, Some(request.instance_id), err)
            })?;
        let status = match spec.state {
            ProvisionState::IsAsync => ResponseStatus::Accepted,
            ProvisionState::IdenticalAlreadyExists => ResponseStatus::Ok,
            ProvisionState::SuccessfulCreated => ResponseStatus::Created,
        };
        ApiResponse::json(status, &ProvisioningResponse {
            dashboard_url: spec.dashboard_url,
            operation: spec.operation,
        })
    }

    /// Handles an update request.
    ///
    /// Every successful update returns 200, including asynchronous ones.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for rejected requests and broker conditions.
    pub fn update(&self, request: &InboundUpdate<'_>) -> Result<ApiResponse, ApiError> {
        self.check_api_version(BrokerOperation::Update, request.api_version)?;
        let details: UpdateDetails = decode_body(request.body)?;
        if let Some(plan_id) = details.requested_plan_id() {
            self.ensure_plan_exists(plan_id)?;
        }

        let spec = self
            .broker
            .update(request.instance_id, &details, request.accepts_incomplete)
            .map_err(|err| broker_failure(BrokerOperation::Update, Some(request.instance_id), err))?;
        if spec.is_async {
            debug!(
                instance_id = %request.instance_id,
                operation = spec.operation.as_deref().unwrap_or(""),
                "update continues asynchronously"
            );
        }
        ApiResponse::json(ResponseStatus::Ok, &UpdateResponse {
            operation: spec.operation,
            dashboard_url: spec.dashboard_url,
        })
    }

    /// Applies version gating to the declared API version.
    fn check_api_version(
        &self,
        operation: BrokerOperation,
        header: Option<&str>,
    ) -> Result<(), ApiError> {
        debug!(
            operation = operation.as_str(),
            api_version = header.unwrap_or("none"),
            "broker api version"
        );
        let Some(min) = self.policy.min_api_version else {
            return Ok(());
        };
        let header = header.ok_or(ApiError::MissingVersion)?;
        let version: ApiVersion =
            header.parse().map_err(|_| ApiError::InvalidVersion(header.to_string()))?;
        if version < min {
            return Err(ApiError::VersionTooLow {
                min,
            });
        }
        Ok(())
    }

    /// Fails with [`ApiError::UnknownPlan`] unless the catalog declares `plan_id`.
    fn ensure_plan_exists(&self, plan_id: &str) -> Result<(), ApiError> {
        let catalog = self
            .broker
            .catalog()
            .map_err(|err| broker_failure(BrokerOperation::Catalog, None, err))?;
        if plan_exists(&catalog, plan_id) {
            Ok(())
        } else {
            Err(ApiError::UnknownPlan)
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the media type is `application/json`, ignoring
/// parameters such as `charset` and letter case.
fn is_json_content_type(value: Option<&str>) -> bool {
    value.is_some_and(|value| {
        let essence = value.split(';').next().unwrap_or_default().trim();
        essence.eq_ignore_ascii_case("application/json")
    })
}

/// Decodes a JSON request body.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        ApiError::InvalidParameters(format!("Required parameters not provided. detail: {err}"))
    })
}

/// Requires org/space GUIDs and checks them against the platform context.
fn check_org_space_guids(details: &ProvisionDetails) -> Result<(), ApiError> {
    let (Some(organization_guid), Some(space_guid)) =
        (details.organization_guid.as_deref(), details.space_guid.as_deref())
    else {
        return Err(ApiError::OrgSpaceGuid(
            "organization_guid and space_guid are required.".to_string(),
        ));
    };
    if details.context_str("organization_guid").is_some_and(|guid| guid != organization_guid) {
        return Err(ApiError::OrgSpaceGuid(
            "organization_guid does not match context.".to_string(),
        ));
    }
    if details.context_str("space_guid").is_some_and(|guid| guid != space_guid) {
        return Err(ApiError::OrgSpaceGuid("space_guid does not match context.".to_string()));
    }
    Ok(())
}

/// Logs a broker condition and converts it into an [`ApiError`].
fn broker_failure(
    operation: BrokerOperation,
    instance_id: Option<&InstanceId>,
    err: BrokerError,
) -> ApiError {
    let instance_id = instance_id.map_or("", InstanceId::as_str);
    match &err {
        BrokerError::Service(_) | BrokerError::NotImplemented(_) => error!(
            operation = operation.as_str(),
            instance_id,
            kind = err.kind(),
            error = %err,
            "broker operation failed"
        ),
        _ => warn!(
            operation = operation.as_str(),
            instance_id,
            kind = err.kind(),
            "broker rejected request"
        ),
    }
    ApiError::Broker(err)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
