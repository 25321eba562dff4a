// crates/openbroker-core/src/runtime/response.rs
// ============================================================================
// Module: OpenBroker Responses
// Description: Transport-agnostic response descriptors and request errors.
// Purpose: Map handler outcomes and broker conditions onto protocol responses.
// Dependencies: crate::interfaces, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Handlers produce an [`ApiResponse`] (status plus JSON body) on success and
//! an [`ApiError`] on failure. [`ApiError::to_response`] is the single place
//! where failures become status codes and error bodies, so every transport
//! renders the same protocol surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::Service;
use crate::interfaces::BrokerError;
use crate::runtime::policy::ApiVersion;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Description returned for a non-JSON content type.
pub const CONTENT_TYPE_DESCRIPTION: &str =
    "Improper Content-Type header. Expecting \"application/json\"";
/// Description returned when the plan is not in the catalog.
pub const UNKNOWN_PLAN_DESCRIPTION: &str = "plan_id not found in this service.";
/// Description returned when the broker requires async support.
pub const ASYNC_REQUIRED_DESCRIPTION: &str =
    "This service plan requires client support for asynchronous service operations.";
/// Description returned for concurrent access to the same instance.
pub const CONCURRENCY_DESCRIPTION: &str =
    "The Service Broker does not support concurrent requests that mutate the same resource.";
/// Description returned when the version header is missing.
pub const MISSING_VERSION_DESCRIPTION: &str = "No X-Broker-Api-Version found.";
/// Description returned for internal failures.
pub const UNEXPECTED_ERROR_DESCRIPTION: &str = "Unexpected error";
/// Description returned for unimplemented broker operations.
pub const NOT_IMPLEMENTED_DESCRIPTION: &str = "Not Implemented";

// ============================================================================
// SECTION: Status
// ============================================================================

/// Response statuses used by the broker protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// 200 OK.
    Ok,
    /// 201 Created.
    Created,
    /// 202 Accepted.
    Accepted,
    /// 400 Bad Request.
    BadRequest,
    /// 409 Conflict.
    Conflict,
    /// 412 Precondition Failed.
    PreconditionFailed,
    /// 422 Unprocessable Entity.
    UnprocessableEntity,
    /// 500 Internal Server Error.
    InternalServerError,
    /// 501 Not Implemented.
    NotImplemented,
}

impl ResponseStatus {
    /// Returns the numeric HTTP status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::Accepted => 202,
            Self::BadRequest => 400,
            Self::Conflict => 409,
            Self::PreconditionFailed => 412,
            Self::UnprocessableEntity => 422,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Created | Self::Accepted)
    }
}

// ============================================================================
// SECTION: Response Bodies
// ============================================================================

/// Status plus JSON body produced by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Response status.
    pub status: ResponseStatus,
    /// JSON response body.
    pub body: Value,
}

impl ApiResponse {
    /// Serializes `body` into a response with the given status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serialization`] when the body cannot be encoded.
    pub fn json<T: Serialize>(status: ResponseStatus, body: &T) -> Result<Self, ApiError> {
        let body =
            serde_json::to_value(body).map_err(|err| ApiError::Serialization(err.to_string()))?;
        Ok(Self {
            status,
            body,
        })
    }

    /// Returns a response with an empty JSON object body.
    #[must_use]
    pub fn empty(status: ResponseStatus) -> Self {
        Self {
            status,
            body: Value::Object(Map::new()),
        }
    }
}

/// Error body `{error?, description}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable description.
    pub description: String,
}

impl ErrorResponse {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: Option<&str>, description: impl Into<String>) -> Self {
        Self {
            error: error.map(str::to_string),
            description: description.into(),
        }
    }

    /// Converts the body into JSON.
    fn into_value(self) -> Value {
        let mut body = Map::new();
        if let Some(error) = self.error {
            body.insert("error".to_string(), Value::String(error));
        }
        body.insert("description".to_string(), Value::String(self.description));
        Value::Object(body)
    }
}

/// Body of a successful provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningResponse {
    /// Dashboard URL for the instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Operation token for polling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// Body of a successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResponse {
    /// Operation token for polling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Dashboard URL for the instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

/// Body of the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogResponse {
    /// Services offered by the broker.
    pub services: Vec<Service>,
}

// ============================================================================
// SECTION: Request Errors
// ============================================================================

/// Errors produced while handling a broker request.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Content type is not `application/json`.
    #[error("improper content type")]
    ContentType,
    /// Plan id is not declared by the catalog.
    #[error("plan_id not found in catalog")]
    UnknownPlan,
    /// Request body or query parameters are invalid.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// API version header is missing while gating is enabled.
    #[error("missing api version header")]
    MissingVersion,
    /// API version header is not `major.minor`.
    #[error("invalid api version header: {0}")]
    InvalidVersion(String),
    /// API version is lower than the configured minimum.
    #[error("api version below minimum {min}")]
    VersionTooLow {
        /// Minimum accepted version.
        min: ApiVersion,
    },
    /// Org/space GUIDs are missing or inconsistent.
    #[error("org/space guid check failed: {0}")]
    OrgSpaceGuid(String),
    /// Broker signaled a condition.
    #[error(transparent)]
    Broker(#[from] BrokerError),
    /// Response encoding failed.
    #[error("response serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Returns a stable label for logging and audit records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ContentType => "content_type",
            Self::UnknownPlan => "unknown_plan",
            Self::InvalidParameters(_) => "invalid_parameters",
            Self::MissingVersion => "missing_version",
            Self::InvalidVersion(_) => "invalid_version",
            Self::VersionTooLow {
                ..
            } => "version_too_low",
            Self::OrgSpaceGuid(_) => "org_space_guid",
            Self::Broker(err) => err.kind(),
            Self::Serialization(_) => "serialization",
        }
    }

    /// Returns true when the error indicates a failure inside the broker or
    /// this crate rather than a rejected request.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.status().code() >= 500
    }

    /// Returns the response status for the error.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        match self {
            Self::ContentType
            | Self::UnknownPlan
            | Self::InvalidParameters(_)
            | Self::MissingVersion
            | Self::InvalidVersion(_)
            | Self::OrgSpaceGuid(_)
            | Self::Broker(BrokerError::BadRequest(_) | BrokerError::InvalidParameters(_)) => {
                ResponseStatus::BadRequest
            }
            Self::VersionTooLow {
                ..
            } => ResponseStatus::PreconditionFailed,
            Self::Broker(BrokerError::InstanceAlreadyExists) => ResponseStatus::Conflict,
            Self::Broker(BrokerError::AsyncRequired | BrokerError::ConcurrentInstanceAccess) => {
                ResponseStatus::UnprocessableEntity
            }
            Self::Broker(BrokerError::NotImplemented(_)) => ResponseStatus::NotImplemented,
            Self::Broker(
                BrokerError::InstanceDoesNotExist
                | BrokerError::BindingAlreadyExists
                | BrokerError::BindingDoesNotExist
                | BrokerError::AppGuidNotProvided
                | BrokerError::Service(_),
            )
            | Self::Serialization(_) => ResponseStatus::InternalServerError,
        }
    }

    /// Renders the error as a protocol response.
    #[must_use]
    pub fn to_response(&self) -> ApiResponse {
        let status = self.status();
        let body = match self {
            Self::ContentType => ErrorResponse::new(Some("ContentTypeError"), CONTENT_TYPE_DESCRIPTION),
            Self::UnknownPlan => ErrorResponse::new(None, UNKNOWN_PLAN_DESCRIPTION),
            Self::InvalidParameters(detail) | Self::Broker(BrokerError::InvalidParameters(detail)) => {
                ErrorResponse::new(Some("InvalidParameters"), detail.clone())
            }
            Self::MissingVersion => ErrorResponse::new(None, MISSING_VERSION_DESCRIPTION),
            Self::InvalidVersion(value) => {
                ErrorResponse::new(None, format!("Invalid X-Broker-Api-Version: {value}"))
            }
            Self::VersionTooLow {
                min,
            } => ErrorResponse::new(None, format!("Service broker requires version {min}+.")),
            Self::OrgSpaceGuid(detail) | Self::Broker(BrokerError::BadRequest(detail)) => {
                ErrorResponse::new(None, detail.clone())
            }
            Self::Broker(BrokerError::InstanceAlreadyExists) => {
                return ApiResponse::empty(status);
            }
            Self::Broker(BrokerError::AsyncRequired) => {
                ErrorResponse::new(Some("AsyncRequired"), ASYNC_REQUIRED_DESCRIPTION)
            }
            Self::Broker(BrokerError::ConcurrentInstanceAccess) => {
                ErrorResponse::new(Some("ConcurrencyError"), CONCURRENCY_DESCRIPTION)
            }
            Self::Broker(BrokerError::NotImplemented(_)) => {
                ErrorResponse::new(None, NOT_IMPLEMENTED_DESCRIPTION)
            }
            Self::Broker(
                BrokerError::InstanceDoesNotExist
                | BrokerError::BindingAlreadyExists
                | BrokerError::BindingDoesNotExist
                | BrokerError::AppGuidNotProvided
                | BrokerError::Service(_),
            )
            | Self::Serialization(_) => ErrorResponse::new(None, UNEXPECTED_ERROR_DESCRIPTION),
        };
        ApiResponse {
            status,
            body: body.into_value(),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
