// crates/openbroker-core/tests/org_space_policy.rs
// ============================================================================
// Module: Org/Space Policy Tests
// Description: Optional org/space GUID enforcement on provision.
// Purpose: Ensure the check is inert by default and strict when enabled.
// ============================================================================

//! Optional org/space GUID enforcement on provision.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;

use openbroker_core::ApiError;
use openbroker_core::ApiResponse;
use openbroker_core::ApiVersion;
use openbroker_core::HandlerPolicy;
use openbroker_core::InboundProvision;
use openbroker_core::InstanceId;
use openbroker_core::ProvisionDetails;
use serde_json::Value;
use serde_json::json;

mod common;
use crate::common::RecordingBroker;
use crate::common::handler_for;
use crate::common::sample_catalog;

fn provision(
    broker: &Arc<RecordingBroker>,
    policy: HandlerPolicy,
    api_version: Option<&str>,
    body: &Value,
) -> Result<ApiResponse, ApiError> {
    let handler = handler_for(broker, policy);
    let instance_id = InstanceId::new("abc");
    let body = serde_json::to_vec(body).unwrap();
    handler.provision(&InboundProvision {
        instance_id: &instance_id,
        content_type: Some("application/json"),
        api_version,
        accepts_incomplete: false,
        body: &body,
    })
}

#[test]
fn guids_are_optional_by_default() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    provision(&broker, HandlerPolicy::default(), None, &json!({"service_id": "s1", "plan_id": "p1"}))
        .expect("provision");
    assert_eq!(broker.mutations().len(), 1);
}

#[test]
fn enabled_check_requires_guids() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let policy = HandlerPolicy::default().with_org_space_check();
    let err = provision(&broker, policy, None, &json!({"service_id": "s1", "plan_id": "p1"}))
        .unwrap_err();
    assert!(matches!(err, ApiError::OrgSpaceGuid(_)));
    assert_eq!(err.to_response().status.code(), 400);
    assert!(broker.calls().is_empty());
}

#[test]
fn enabled_check_rejects_context_mismatch() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let policy = HandlerPolicy::default().with_org_space_check();
    let body = json!({
        "service_id": "s1",
        "plan_id": "p1",
        "organization_guid": "org-a",
        "space_guid": "space-a",
        "context": {"organization_guid": "org-b", "space_guid": "space-a"}
    });
    let err = provision(&broker, policy, None, &body).unwrap_err();
    assert_eq!(err, ApiError::OrgSpaceGuid("organization_guid does not match context.".to_string()));
}

#[test]
fn enabled_check_accepts_consistent_guids() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let policy = HandlerPolicy::default().with_org_space_check();
    let body = json!({
        "service_id": "s1",
        "plan_id": "p1",
        "organization_guid": "org-a",
        "space_guid": "space-a",
        "context": {"organization_guid": "org-a", "space_guid": "space-a"}
    });
    provision(&broker, policy, None, &body).expect("provision");
}

#[test]
fn context_guids_are_visible_through_accessors() {
    let details: ProvisionDetails = serde_json::from_value(json!({
        "service_id": "s1",
        "plan_id": "p1",
        "context": {"organization_guid": "ctx-org", "space_guid": "ctx-space"}
    }))
    .unwrap();
    assert_eq!(details.organization_guid, None);
    assert_eq!(details.effective_organization_guid(), Some("ctx-org"));
    assert_eq!(details.effective_space_guid(), Some("ctx-space"));
}

#[test]
fn version_gating_requires_header() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let policy = HandlerPolicy::default().with_min_api_version(ApiVersion::MINIMUM);
    let body = json!({"service_id": "s1", "plan_id": "p1"});

    let err = provision(&broker, policy, None, &body).unwrap_err();
    assert_eq!(err, ApiError::MissingVersion);
    assert_eq!(err.to_response().body, json!({"description": "No X-Broker-Api-Version found."}));

    let err = provision(&broker, policy, Some("latest"), &body).unwrap_err();
    assert_eq!(err, ApiError::InvalidVersion("latest".to_string()));

    provision(&broker, policy, Some("2.15"), &body).expect("provision");
}
