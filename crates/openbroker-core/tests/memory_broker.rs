// crates/openbroker-core/tests/memory_broker.rs
// ============================================================================
// Module: In-Memory Broker Tests
// Description: Idempotence, conflicts, and async plans of the reference broker.
// Purpose: Ensure repeated provisions never conflict without a real conflict.
// ============================================================================

//! Idempotence, conflicts, and async plans of the reference broker.

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

use openbroker_core::BrokerError;
use openbroker_core::BrokerHandler;
use openbroker_core::Catalog;
use openbroker_core::DeprovisionDetails;
use openbroker_core::HandlerPolicy;
use openbroker_core::InMemoryBroker;
use openbroker_core::InboundProvision;
use openbroker_core::InstanceId;
use openbroker_core::OperationState;
use openbroker_core::ProvisionDetails;
use openbroker_core::ProvisionState;
use openbroker_core::Service;
use openbroker_core::ServiceBroker;
use openbroker_core::ServicePlan;
use openbroker_core::ServicePlanMetadata;
use openbroker_core::UpdateDetails;
use serde_json::Value;
use serde_json::json;

fn catalog() -> Catalog {
    let mut async_plan = ServicePlan::new("slow", "slow", "Async only plan");
    let mut metadata = ServicePlanMetadata::default();
    metadata.extra.insert("async_required".to_string(), Value::Bool(true));
    async_plan.metadata = Some(metadata);
    let mut service = Service::new(
        "s1",
        "sample",
        "Sample service",
        true,
        vec![ServicePlan::new("p1", "small", "Small plan"), ServicePlan::new("p2", "large", "Large plan"), async_plan],
    );
    service.plan_updateable = true;
    Catalog::Single(service)
}

#[test]
fn repeated_identical_provision_returns_200_not_409() {
    let broker = Arc::new(InMemoryBroker::new(catalog()));
    let handler = BrokerHandler::new(broker, HandlerPolicy::default());
    let instance_id = InstanceId::new("abc");
    let body = serde_json::to_vec(&json!({
        "service_id": "s1",
        "plan_id": "p1",
        "parameters": {"size": 1}
    }))
    .unwrap();
    let request = InboundProvision {
        instance_id: &instance_id,
        content_type: Some("application/json"),
        api_version: None,
        accepts_incomplete: false,
        body: &body,
    };

    let first = handler.provision(&request).expect("first provision");
    assert_eq!(first.status.code(), 201);
    let second = handler.provision(&request).expect("second provision");
    assert_eq!(second.status.code(), 200);
    let third = handler.provision(&request).expect("third provision");
    assert_eq!(third.status.code(), 200);
}

#[test]
fn different_details_for_same_instance_conflict() {
    let broker = InMemoryBroker::new(catalog());
    let instance_id = InstanceId::new("abc");
    broker.provision(&instance_id, &ProvisionDetails::new("s1", "p1"), false).unwrap();
    let err = broker.provision(&instance_id, &ProvisionDetails::new("s1", "p2"), false).unwrap_err();
    assert_eq!(err, BrokerError::InstanceAlreadyExists);
}

#[test]
fn async_plans_require_accepts_incomplete() {
    let broker = InMemoryBroker::new(catalog());
    let instance_id = InstanceId::new("abc");
    let details = ProvisionDetails::new("s1", "slow");
    let err = broker.provision(&instance_id, &details, false).unwrap_err();
    assert_eq!(err, BrokerError::AsyncRequired);
    assert_eq!(broker.instance_count().unwrap(), 0);

    let spec = broker.provision(&instance_id, &details, true).unwrap();
    assert_eq!(spec.state, ProvisionState::IsAsync);
    assert_eq!(spec.operation.as_deref(), Some("provision-abc"));

    let last = broker.last_operation(&instance_id, Some("provision-abc")).unwrap();
    assert_eq!(last.state, OperationState::Succeeded);
}

#[test]
fn update_changes_plan_and_parameters() {
    let broker = InMemoryBroker::new(catalog()).with_dashboard_base("https://dash.example/");
    let instance_id = InstanceId::new("abc");
    broker.provision(&instance_id, &ProvisionDetails::new("s1", "p1"), false).unwrap();

    let mut details = UpdateDetails::new("s1");
    details.plan_id = Some("p2".to_string());
    details.parameters = json!({"size": 2}).as_object().cloned();
    let spec = broker.update(&instance_id, &details, false).unwrap();
    assert!(!spec.is_async);
    assert_eq!(spec.dashboard_url.as_deref(), Some("https://dash.example/abc"));

    let fetched = broker.get_instance(&instance_id).unwrap();
    assert_eq!(fetched.plan_id, "p2");
    assert_eq!(fetched.parameters, json!({"size": 2}).as_object().cloned());
}

#[test]
fn update_of_unknown_instance_fails() {
    let broker = InMemoryBroker::new(catalog());
    let err = broker.update(&InstanceId::new("nope"), &UpdateDetails::new("s1"), false).unwrap_err();
    assert_eq!(err, BrokerError::InstanceDoesNotExist);
}

#[test]
fn deprovision_removes_instance() {
    let broker = InMemoryBroker::new(catalog());
    let instance_id = InstanceId::new("abc");
    broker.provision(&instance_id, &ProvisionDetails::new("s1", "p1"), false).unwrap();
    let details = DeprovisionDetails {
        service_id: "s1".to_string(),
        plan_id: "p1".to_string(),
    };
    broker.deprovision(&instance_id, &details, false).unwrap();
    assert_eq!(broker.instance_count().unwrap(), 0);
    assert_eq!(
        broker.deprovision(&instance_id, &details, false).unwrap_err(),
        BrokerError::InstanceDoesNotExist
    );
}

#[test]
fn repeat_with_only_context_changes_is_identical() {
    let broker = InMemoryBroker::new(catalog());
    let instance_id = InstanceId::new("abc");
    let mut first = ProvisionDetails::new("s1", "p1");
    first.parameters = json!({"size": 1}).as_object().cloned();
    first.context = json!({"platform": "cloudfoundry"}).as_object().cloned();
    first.organization_guid = Some("org-1".to_string());
    assert_eq!(
        broker.provision(&instance_id, &first, false).unwrap().state,
        ProvisionState::SuccessfulCreated
    );

    let mut repeat = ProvisionDetails::new("s1", "p1");
    repeat.parameters = json!({"size": 1}).as_object().cloned();
    repeat.context = json!({"platform": "kubernetes"}).as_object().cloned();
    repeat.extra.insert("maintenance_info".to_string(), json!({"version": "1.0.0"}));
    assert_eq!(
        broker.provision(&instance_id, &repeat, false).unwrap().state,
        ProvisionState::IdenticalAlreadyExists
    );

    repeat.parameters = json!({"size": 2}).as_object().cloned();
    assert_eq!(
        broker.provision(&instance_id, &repeat, false).unwrap_err(),
        BrokerError::InstanceAlreadyExists
    );
}

#[test]
fn repeat_after_update_compares_current_state() {
    let broker = InMemoryBroker::new(catalog());
    let instance_id = InstanceId::new("abc");
    broker.provision(&instance_id, &ProvisionDetails::new("s1", "p1"), false).unwrap();

    let mut update = UpdateDetails::new("s1");
    update.plan_id = Some("p2".to_string());
    broker.update(&instance_id, &update, false).unwrap();

    assert_eq!(
        broker.provision(&instance_id, &ProvisionDetails::new("s1", "p1"), false).unwrap_err(),
        BrokerError::InstanceAlreadyExists
    );
    assert_eq!(
        broker.provision(&instance_id, &ProvisionDetails::new("s1", "p2"), false).unwrap().state,
        ProvisionState::IdenticalAlreadyExists
    );
}
