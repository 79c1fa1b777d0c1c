//! Tests for the shipped demonstration artifact
//!
//! Loads `models/obesity_forest.json` through the same path the service
//! uses and checks its classifications across the BMI range.

use std::path::PathBuf;

use obesity_common::record::{
    Frequency, Gender, PatientRecord, TransportMode, VegetableFrequency, YesNo,
};
use obesity_common::{assess, encode, ClassIndex, Framing, Tier};
use obesity_predictor::model::{ModelHandle, ModelStatus};

fn demo_artifact() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models/obesity_forest.json")
}

/// Reference scenario with adjustable weight
fn record(weight: f64) -> PatientRecord {
    PatientRecord {
        gender: Gender::Woman,
        age: 25,
        height: 1.70,
        weight,
        family_history_overweight: YesNo::No,
        eats_caloric_food: YesNo::No,
        vegetable_frequency: VegetableFrequency::Rarely,
        meals_per_day: 3,
        eats_between_meals: Frequency::Sometimes,
        smokes: YesNo::No,
        daily_water_liters: 2.0,
        monitors_calories: YesNo::No,
        physical_activity_days: 3,
        screen_time_hours: 4,
        alcohol_frequency: Frequency::Sometimes,
        transport_mode: TransportMode::PublicTransport,
    }
}

#[test]
fn test_demo_artifact_loads() {
    let handle = ModelHandle::from_path(demo_artifact());

    match handle.load() {
        ModelStatus::Available { model } => {
            assert_eq!(model.kind, "random_forest");
            assert_eq!(model.classes, 7);
            assert_eq!(model.trees, 3);
            assert!(model.source.unwrap().ends_with("obesity_forest.json"));
        }
        other => panic!("Demo artifact should load, got {:?}", other),
    }
}

#[test]
fn test_reference_scenario_is_normal_weight() {
    let handle = ModelHandle::from_path(demo_artifact());

    let class = handle.predict(&encode(&record(70.0))).unwrap();
    assert_eq!(class, ClassIndex(1));

    let assessment = assess(class, Framing::Consumer);
    assert_eq!(assessment.label, "Normal weight");
    assert_eq!(assessment.tier, Some(Tier::Informational));
}

#[test]
fn test_demo_artifact_covers_all_classes() {
    let handle = ModelHandle::from_path(demo_artifact());

    // 1.70 m: BMI 17.3, 24.2, 26.6, 29.1, 32.9, 38.1, 45.0
    let cases = [
        (50.0, 0),
        (70.0, 1),
        (77.0, 2),
        (84.0, 3),
        (95.0, 4),
        (110.0, 5),
        (130.0, 6),
    ];

    for (weight, expected) in cases {
        let class = handle.predict(&encode(&record(weight))).unwrap();
        assert_eq!(class, ClassIndex(expected), "weight {} kg", weight);
    }
}
