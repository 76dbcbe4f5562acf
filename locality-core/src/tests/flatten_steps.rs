//! Behaviour-driven step definitions for hierarchy flattening.

use crate::{COUNTRY_CODE, Delegation, Flattener, Governorate, LocationRecord, TraversalAnomaly};
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

const TUNIS_CENTROID: Coord<f64> = Coord {
    x: 10.1815,
    y: 36.8065,
};

#[derive(Debug, Default)]
struct FlattenWorld {
    governorates: RefCell<Vec<Governorate>>,
    records: RefCell<Vec<LocationRecord>>,
    anomalies: RefCell<Vec<TraversalAnomaly>>,
}

#[fixture]
fn flatten_world() -> FlattenWorld {
    FlattenWorld::default()
}

#[given(
    "the Tunis governorate with delegation \"A\" holding \"X\" and \"Y\" and an empty delegation \"B\""
)]
fn tunis_with_empty_delegation(#[from(flatten_world)] world: &FlattenWorld) {
    let tunis = Governorate::new("Tunis", "11", TUNIS_CENTROID)
        .with_delegation(Delegation::new("A", ["X", "Y"]))
        .with_delegation(Delegation::new("B", Vec::<String>::new()));
    world.governorates.replace(vec![tunis]);
}

#[when("I flatten the hierarchy")]
fn flatten(#[from(flatten_world)] world: &FlattenWorld) {
    let governorates = world.governorates.borrow();
    let flattener = Flattener::new(&governorates, "Tunisie");
    world.records.replace(flattener.records().collect());
    world.anomalies.replace(flattener.anomalies());
}

#[then("exactly the records \"X\" and \"Y\" under delegation \"A\" are produced")]
fn two_records_under_a(#[from(flatten_world)] world: &FlattenWorld) {
    let records = world.records.borrow();
    let produced: Vec<_> = records
        .iter()
        .map(|record| (record.delegation.as_str(), record.name.as_str()))
        .collect();
    assert_eq!(produced, [("A", "X"), ("A", "Y")]);
}

#[then("the empty delegation is reported as an anomaly")]
fn empty_delegation_reported(#[from(flatten_world)] world: &FlattenWorld) {
    assert_eq!(
        *world.anomalies.borrow(),
        [TraversalAnomaly::EmptyDelegation {
            governorate: "Tunis".into(),
            delegation: "B".into(),
        }]
    );
}

#[then("every record carries the Tunis centroid and the TN country code")]
fn records_carry_context(#[from(flatten_world)] world: &FlattenWorld) {
    let records = world.records.borrow();
    assert!(!records.is_empty(), "expected records to be produced");
    for record in records.iter() {
        assert_eq!(record.location, TUNIS_CENTROID);
        assert_eq!(record.country_code, COUNTRY_CODE);
        assert_eq!(record.governorate, "Tunis");
        assert_eq!(record.governorate_code, "11");
        assert!(record.created_at.is_none());
    }
}

#[then("every record key is the lowercased name")]
fn keys_are_lowercase(#[from(flatten_world)] world: &FlattenWorld) {
    for record in world.records.borrow().iter() {
        assert_eq!(record.name_lower, record.name.to_lowercase());
    }
}

#[scenario(path = "tests/features/flatten_hierarchy.feature", index = 0)]
fn skipping_empty_delegation(#[from(flatten_world)] world: FlattenWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/flatten_hierarchy.feature", index = 1)]
fn records_inherit_context(#[from(flatten_world)] world: FlattenWorld) {
    let _ = world;
}
