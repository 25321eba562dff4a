// crates/openbroker-core/tests/provision_handler.rs
// ============================================================================
// Module: Provision Handler Tests
// Description: Validation order and status mapping for provision requests.
// Purpose: Ensure each broker outcome maps to exactly one protocol response.
// ============================================================================

//! Validation order and status mapping for provision requests.

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
use openbroker_core::ApiVersion;
use openbroker_core::BrokerError;
use openbroker_core::BrokerOperation;
use openbroker_core::HandlerPolicy;
use openbroker_core::InboundProvision;
use openbroker_core::InstanceId;
use openbroker_core::ProvisionedServiceSpec;
use openbroker_core::ResponseStatus;
use serde_json::Value;
use serde_json::json;

mod common;
use crate::common::RecordedCall;
use crate::common::RecordingBroker;
use crate::common::handler_for;
use crate::common::sample_catalog;

const JSON: Option<&str> = Some("application/json");

fn provision(
    broker: &Arc<RecordingBroker>,
    policy: HandlerPolicy,
    content_type: Option<&str>,
    body: &Value,
) -> Result<openbroker_core::ApiResponse, ApiError> {
    let handler = handler_for(broker, policy);
    let instance_id = InstanceId::new("abc");
    let body = serde_json::to_vec(body).unwrap();
    handler.provision(&InboundProvision {
        instance_id: &instance_id,
        content_type,
        api_version: Some("2.13"),
        accepts_incomplete: false,
        body: &body,
    })
}

fn valid_body() -> Value {
    json!({"service_id": "s1", "plan_id": "p1"})
}

#[test]
fn created_maps_to_201_with_broker_fields() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()).with_provision(Ok(
        ProvisionedServiceSpec::created().dashboard_url("d").operation("o"),
    )));
    let response =
        provision(&broker, HandlerPolicy::default(), JSON, &valid_body()).expect("provision");
    assert_eq!(response.status, ResponseStatus::Created);
    assert_eq!(response.status.code(), 201);
    assert_eq!(response.body, json!({"dashboard_url": "d", "operation": "o"}));
}

#[test]
fn async_maps_to_202() {
    let broker = Arc::new(
        RecordingBroker::new(sample_catalog())
            .with_provision(Ok(ProvisionedServiceSpec::in_progress("op-1"))),
    );
    let response =
        provision(&broker, HandlerPolicy::default(), JSON, &valid_body()).expect("provision");
    assert_eq!(response.status.code(), 202);
    assert_eq!(response.body, json!({"operation": "op-1"}));
}

#[test]
fn identical_existing_maps_to_200() {
    let broker = Arc::new(
        RecordingBroker::new(sample_catalog())
            .with_provision(Ok(ProvisionedServiceSpec::identical().dashboard_url("d"))),
    );
    let response =
        provision(&broker, HandlerPolicy::default(), JSON, &valid_body()).expect("provision");
    assert_eq!(response.status.code(), 200);
    assert_eq!(response.body, json!({"dashboard_url": "d"}));
}

#[test]
fn conflicting_instance_maps_to_409_with_empty_body() {
    let broker = Arc::new(
        RecordingBroker::new(sample_catalog())
            .with_provision(Err(BrokerError::InstanceAlreadyExists)),
    );
    let err = provision(&broker, HandlerPolicy::default(), JSON, &valid_body()).unwrap_err();
    let response = err.to_response();
    assert_eq!(response.status.code(), 409);
    assert_eq!(response.body, json!({}));
}

#[test]
fn async_required_maps_to_422() {
    let broker = Arc::new(
        RecordingBroker::new(sample_catalog()).with_provision(Err(BrokerError::AsyncRequired)),
    );
    let response =
        provision(&broker, HandlerPolicy::default(), JSON, &valid_body()).unwrap_err().to_response();
    assert_eq!(response.status, ResponseStatus::UnprocessableEntity);
    assert_eq!(
        response.body,
        json!({
            "error": "AsyncRequired",
            "description": "This service plan requires client support for asynchronous service operations."
        })
    );
}

#[test]
fn unknown_plan_is_rejected_before_broker_call() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let err = provision(
        &broker,
        HandlerPolicy::default(),
        JSON,
        &json!({"service_id": "s1", "plan_id": "missing"}),
    )
    .unwrap_err();
    assert_eq!(err, ApiError::UnknownPlan);
    assert_eq!(err.to_response().status.code(), 400);
    assert!(broker.mutations().is_empty());
}

#[test]
fn wrong_content_type_is_rejected_before_catalog_lookup() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let err =
        provision(&broker, HandlerPolicy::default(), Some("text/plain"), &valid_body()).unwrap_err();
    assert_eq!(err, ApiError::ContentType);
    let response = err.to_response();
    assert_eq!(response.status.code(), 400);
    assert_eq!(response.body["error"], json!("ContentTypeError"));
    assert!(broker.calls().is_empty());

    let err = provision(&broker, HandlerPolicy::default(), None, &valid_body()).unwrap_err();
    assert_eq!(err, ApiError::ContentType);
    assert!(broker.calls().is_empty());
}

#[test]
fn missing_required_fields_are_invalid_parameters() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let err =
        provision(&broker, HandlerPolicy::default(), JSON, &json!({"service_id": "s1"})).unwrap_err();
    let response = err.to_response();
    assert_eq!(response.status.code(), 400);
    assert_eq!(response.body["error"], json!("InvalidParameters"));
    assert!(broker.calls().is_empty());
}

#[test]
fn request_fields_reach_the_broker_unmodified() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let body = json!({
        "service_id": "s1",
        "plan_id": "p1",
        "organization_guid": "org",
        "space_guid": "space",
        "parameters": {"size": 3, "nested": {"flag": true, "list": [1, "two", null]}},
        "context": {"platform": "cloudfoundry", "instance_name": "db"},
        "maintenance_info": {"version": "1.0.0"}
    });
    provision(&broker, HandlerPolicy::default(), JSON, &body).expect("provision");

    let calls = broker.mutations();
    assert_eq!(calls.len(), 1);
    let RecordedCall::Provision {
        instance_id,
        details,
        async_allowed,
    } = &calls[0]
    else {
        panic!("expected provision call, got {calls:?}");
    };
    assert_eq!(instance_id.as_str(), "abc");
    assert!(!async_allowed);
    assert_eq!(serde_json::to_value(details).unwrap(), body);
}

#[test]
fn accepts_incomplete_is_passed_through() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let handler = handler_for(&broker, HandlerPolicy::default());
    let instance_id = InstanceId::new("abc");
    let body = serde_json::to_vec(&valid_body()).unwrap();
    handler
        .provision(&InboundProvision {
            instance_id: &instance_id,
            content_type: JSON,
            api_version: None,
            accepts_incomplete: true,
            body: &body,
        })
        .expect("provision");
    assert!(matches!(
        broker.mutations().as_slice(),
        [RecordedCall::Provision {
            async_allowed: true,
            ..
        }]
    ));
}

#[test]
fn unimplemented_broker_surfaces_501() {
    let broker = Arc::new(
        RecordingBroker::new(sample_catalog())
            .with_provision(Err(BrokerError::NotImplemented(BrokerOperation::Provision))),
    );
    let response =
        provision(&broker, HandlerPolicy::default(), JSON, &valid_body()).unwrap_err().to_response();
    assert_eq!(response.status.code(), 501);
}

#[test]
fn version_gating_rejects_old_clients() {
    let broker = Arc::new(RecordingBroker::new(sample_catalog()));
    let policy = HandlerPolicy::default().with_min_api_version(ApiVersion::new(2, 14));
    let err = provision(&broker, policy, JSON, &valid_body()).unwrap_err();
    assert_eq!(
        err,
        ApiError::VersionTooLow {
            min: ApiVersion::new(2, 14)
        }
    );
    assert_eq!(err.to_response().status.code(), 412);
    assert!(broker.calls().is_empty());
}
