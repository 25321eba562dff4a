// crates/openbroker-core/tests/catalog_lookup.rs
// ============================================================================
// Module: Catalog Lookup Tests
// Description: Plan existence checks over single and multi-service catalogs.
// Purpose: Ensure lookups match exactly the declared plan ids.
// ============================================================================

//! Plan existence checks over single and multi-service catalogs.

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

use openbroker_core::Catalog;
use openbroker_core::Service;
use openbroker_core::ServicePlan;
use openbroker_core::plan_exists;
use proptest::prelude::*;
use serde_json::json;

fn service_with_plans(id: &str, plan_ids: &[String]) -> Service {
    let plans = plan_ids.iter().map(|plan_id| ServicePlan::new(plan_id.as_str(), "plan", "plan")).collect();
    Service::new(id, id, "service", false, plans)
}

#[test]
fn empty_catalog_has_no_plans() {
    assert!(!plan_exists(&Catalog::empty(), "p1"));
    assert!(!plan_exists(&Catalog::Many(vec![service_with_plans("s1", &[])]), "p1"));
}

#[test]
fn single_and_sequence_forms_agree() {
    let service = service_with_plans("s1", &["p1".to_string(), "p2".to_string()]);
    let single = Catalog::from(service.clone());
    let many = Catalog::from(vec![service]);
    for plan_id in ["p1", "p2", "p3", ""] {
        assert_eq!(plan_exists(&single, plan_id), plan_exists(&many, plan_id), "{plan_id}");
    }
}

#[test]
fn lookup_spans_every_service() {
    let catalog = Catalog::Many(vec![
        service_with_plans("s1", &["p1".to_string()]),
        service_with_plans("s2", &["p2".to_string()]),
    ]);
    assert!(catalog.plan_exists("p1"));
    assert!(catalog.plan_exists("p2"));
    assert!(!catalog.plan_exists("P1"));
}

#[test]
fn catalog_decodes_single_object_or_list() {
    let service = json!({
        "id": "s1",
        "name": "svc",
        "description": "d",
        "bindable": true,
        "plan_updateable": true,
        "plans": [{"id": "p1", "name": "small", "description": "d", "metadata": {"async_required": true}}],
        "dashboard_client": {"id": "c", "secret": "s"},
        "x-vendor": 1
    });
    let single: Catalog = serde_json::from_value(service.clone()).unwrap();
    let many: Catalog = serde_json::from_value(json!([service])).unwrap();
    assert!(matches!(single, Catalog::Single(_)));
    assert!(matches!(many, Catalog::Many(_)));
    assert_eq!(single.services(), many.services());

    let decoded = &single.services()[0];
    assert!(decoded.plan_updateable);
    assert!(decoded.plan("p1").unwrap().metadata_flag("async_required"));
    assert_eq!(decoded.extra.get("x-vendor"), Some(&json!(1)));
}

proptest! {
    #[test]
    fn plan_exists_matches_membership(
        services in prop::collection::vec(prop::collection::vec("[a-z0-9]{1,6}", 0..5), 0..5),
        probe in "[a-z0-9]{1,6}",
    ) {
        let catalog = Catalog::Many(
            services
                .iter()
                .enumerate()
                .map(|(index, plans)| service_with_plans(&format!("s{index}"), plans))
                .collect(),
        );
        let expected = services.iter().flatten().any(|plan_id| *plan_id == probe);
        prop_assert_eq!(plan_exists(&catalog, &probe), expected);
        for plan_id in services.iter().flatten() {
            prop_assert!(plan_exists(&catalog, plan_id));
        }
    }
}
