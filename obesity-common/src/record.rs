//! Patient record captured by the form
//!
//! One record per prediction request, never persisted. Categorical answers
//! are closed enums so an unmapped string is rejected when the request body
//! is deserialized rather than reaching the encoder.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::{Error, Result};

pub const AGE_RANGE: RangeInclusive<u32> = 18..=120;
pub const HEIGHT_RANGE_M: RangeInclusive<f64> = 1.0..=2.5;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=300.0;
pub const MEALS_PER_DAY_RANGE: RangeInclusive<u32> = 1..=10;
pub const WATER_RANGE_L: RangeInclusive<f64> = 0.0..=10.0;
pub const ACTIVITY_DAYS_RANGE: RangeInclusive<u32> = 0..=7;
pub const SCREEN_HOURS_RANGE: RangeInclusive<u32> = 0..=24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Woman,
    Man,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

/// Vegetable consumption frequency (3 levels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VegetableFrequency {
    Rarely,
    Sometimes,
    Always,
}

/// Four-level frequency used for snacking and alcohol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Never,
    Sometimes,
    Frequently,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    PublicTransport,
    Walking,
    Car,
    Motorcycle,
    Bicycle,
}

impl TransportMode {
    pub const ALL: [TransportMode; 5] = [
        TransportMode::PublicTransport,
        TransportMode::Walking,
        TransportMode::Car,
        TransportMode::Motorcycle,
        TransportMode::Bicycle,
    ];

    /// Category label as it appears in the training data (`MTRANS` column)
    pub fn training_label(self) -> &'static str {
        match self {
            TransportMode::PublicTransport => "Public_Transportation",
            TransportMode::Walking => "Walking",
            TransportMode::Car => "Automobile",
            TransportMode::Motorcycle => "Motorbike",
            TransportMode::Bicycle => "Bike",
        }
    }
}

/// Anthropometric and lifestyle answers for one individual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    pub gender: Gender,
    /// Years
    pub age: u32,
    /// Meters
    pub height: f64,
    /// Kilograms
    pub weight: f64,
    pub family_history_overweight: YesNo,
    pub eats_caloric_food: YesNo,
    pub vegetable_frequency: VegetableFrequency,
    pub meals_per_day: u32,
    pub eats_between_meals: Frequency,
    pub smokes: YesNo,
    pub daily_water_liters: f64,
    pub monitors_calories: YesNo,
    pub physical_activity_days: u32,
    pub screen_time_hours: u32,
    pub alcohol_frequency: Frequency,
    pub transport_mode: TransportMode,
}

impl PatientRecord {
    /// List every numeric field outside its domain
    ///
    /// Empty when the record is valid. Non-finite floats always fail.
    pub fn violations(&self) -> Vec<String> {
        let mut errors = Vec::new();

        check(&mut errors, "age", self.age, &AGE_RANGE);
        check(&mut errors, "height", self.height, &HEIGHT_RANGE_M);
        check(&mut errors, "weight", self.weight, &WEIGHT_RANGE_KG);
        check(&mut errors, "meals_per_day", self.meals_per_day, &MEALS_PER_DAY_RANGE);
        check(&mut errors, "daily_water_liters", self.daily_water_liters, &WATER_RANGE_L);
        check(
            &mut errors,
            "physical_activity_days",
            self.physical_activity_days,
            &ACTIVITY_DAYS_RANGE,
        );
        check(&mut errors, "screen_time_hours", self.screen_time_hours, &SCREEN_HOURS_RANGE);

        errors
    }

    /// Validate domain bounds
    ///
    /// # Errors
    /// `Error::InvalidInput` naming every out-of-domain field.
    pub fn validate(&self) -> Result<()> {
        let errors = self.violations();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(errors.join("; ")))
        }
    }
}

fn check<T>(errors: &mut Vec<String>, field: &str, value: T, range: &RangeInclusive<T>)
where
    T: PartialOrd + std::fmt::Display,
{
    if !range.contains(&value) {
        errors.push(format!(
            "{} {} out of range [{}, {}]",
            field,
            value,
            range.start(),
            range.end()
        ));
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Reference scenario: 25 year old woman, 1.70 m, 70 kg
    pub fn reference_record() -> PatientRecord {
        PatientRecord {
            gender: Gender::Woman,
            age: 25,
            height: 1.70,
            weight: 70.0,
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
}

#[cfg(test)]
mod tests {
    use super::fixtures::reference_record;
    use super::*;

    #[test]
    fn test_reference_record_is_valid() {
        assert!(reference_record().validate().is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut record = reference_record();
        record.age = 120;
        record.height = 2.5;
        record.weight = 30.0;
        record.meals_per_day = 1;
        record.daily_water_liters = 0.0;
        record.physical_activity_days = 7;
        record.screen_time_hours = 24;
        assert!(record.violations().is_empty());
    }

    #[test]
    fn test_out_of_range_fields_are_all_reported() {
        let mut record = reference_record();
        record.age = 17;
        record.weight = 301.0;
        record.screen_time_hours = 25;

        let errors = record.violations();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("age 17"));
        assert!(errors[1].starts_with("weight 301"));
        assert!(errors[2].starts_with("screen_time_hours 25"));

        match record.validate() {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("age")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_height_rejected() {
        let mut record = reference_record();
        record.height = f64::NAN;
        assert_eq!(record.violations().len(), 1);
    }

    #[test]
    fn test_deserialize_rejects_unmapped_category() {
        let mut value = serde_json::to_value(reference_record()).unwrap();
        value["transport_mode"] = serde_json::json!("Skateboard");
        assert!(serde_json::from_value::<PatientRecord>(value).is_err());
    }

    #[test]
    fn test_deserialize_uses_domain_names() {
        let value = serde_json::to_value(reference_record()).unwrap();
        assert_eq!(value["gender"], "Woman");
        assert_eq!(value["smokes"], "No");
        assert_eq!(value["transport_mode"], "PublicTransport");
        let back: PatientRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, reference_record());
    }

    #[test]
    fn test_training_labels_are_distinct() {
        let mut labels: Vec<_> = TransportMode::ALL.iter().map(|m| m.training_label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 5);
    }
}
