//! Categorical feature encoder
//!
//! Converts the form's categorical answers into the integer/ordinal codes the
//! classifier was trained on. All mappings are total over their enums; numeric
//! fields pass through unchanged. The transport mode stays a categorical label
//! because the pipeline one-hot encodes it itself.

use serde::Serialize;
use tracing::debug;

use crate::record::{Frequency, Gender, PatientRecord, VegetableFrequency, YesNo};

/// Column names in the order the pipeline consumes them
pub const FEATURE_COLUMNS: [&str; 16] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "family_history_with_overweight",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF",
    "TUE",
    "CALC",
    "MTRANS",
];

/// Columns the encoder leaves as categorical labels
pub const CATEGORICAL_COLUMNS: [&str; 1] = ["MTRANS"];

/// Yes → 1, No → 0
pub fn encode_yes_no(value: YesNo) -> u8 {
    match value {
        YesNo::Yes => 1,
        YesNo::No => 0,
    }
}

/// Woman → 1, Man → 0
pub fn encode_gender(value: Gender) -> u8 {
    match value {
        Gender::Woman => 1,
        Gender::Man => 0,
    }
}

/// Never → 0, Sometimes → 1, Frequently → 2, Always → 3
pub fn encode_frequency(value: Frequency) -> u8 {
    match value {
        Frequency::Never => 0,
        Frequency::Sometimes => 1,
        Frequency::Frequently => 2,
        Frequency::Always => 3,
    }
}

/// Rarely → 0, Sometimes → 1, Always → 2
pub fn encode_vegetable_frequency(value: VegetableFrequency) -> u8 {
    match value {
        VegetableFrequency::Rarely => 0,
        VegetableFrequency::Sometimes => 1,
        VegetableFrequency::Always => 2,
    }
}

/// One cell of an encoded row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(&'static str),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&'static str> {
        match self {
            FeatureValue::Category(label) => Some(*label),
            FeatureValue::Number(_) => None,
        }
    }
}

/// Patient record with categorical fields replaced by their codes
///
/// Built fresh per request and dropped once the prediction returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedFeatureVector {
    pub gender: u8,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub family_history_overweight: u8,
    pub eats_caloric_food: u8,
    pub vegetable_frequency: u8,
    pub meals_per_day: u32,
    pub eats_between_meals: u8,
    pub smokes: u8,
    pub daily_water_liters: f64,
    pub monitors_calories: u8,
    pub physical_activity_days: u32,
    pub screen_time_hours: u32,
    pub alcohol_frequency: u8,
    pub transport_mode: &'static str,
}

impl EncodedFeatureVector {
    /// Row values aligned with [`FEATURE_COLUMNS`]
    pub fn row(&self) -> Vec<FeatureValue> {
        use FeatureValue::{Category, Number};

        vec![
            Number(f64::from(self.gender)),
            Number(f64::from(self.age)),
            Number(self.height),
            Number(self.weight),
            Number(f64::from(self.family_history_overweight)),
            Number(f64::from(self.eats_caloric_food)),
            Number(f64::from(self.vegetable_frequency)),
            Number(f64::from(self.meals_per_day)),
            Number(f64::from(self.eats_between_meals)),
            Number(f64::from(self.smokes)),
            Number(self.daily_water_liters),
            Number(f64::from(self.monitors_calories)),
            Number(f64::from(self.physical_activity_days)),
            Number(f64::from(self.screen_time_hours)),
            Number(f64::from(self.alcohol_frequency)),
            Category(self.transport_mode),
        ]
    }

    /// Column name and value pairs, in pipeline order
    pub fn named_row(&self) -> Vec<(&'static str, FeatureValue)> {
        FEATURE_COLUMNS.iter().copied().zip(self.row()).collect()
    }
}

/// Encode a record for the pipeline
///
/// Does not validate domain bounds; callers run [`PatientRecord::validate`]
/// at their boundary.
pub fn encode(record: &PatientRecord) -> EncodedFeatureVector {
    let encoded = EncodedFeatureVector {
        gender: encode_gender(record.gender),
        age: record.age,
        height: record.height,
        weight: record.weight,
        family_history_overweight: encode_yes_no(record.family_history_overweight),
        eats_caloric_food: encode_yes_no(record.eats_caloric_food),
        vegetable_frequency: encode_vegetable_frequency(record.vegetable_frequency),
        meals_per_day: record.meals_per_day,
        eats_between_meals: encode_frequency(record.eats_between_meals),
        smokes: encode_yes_no(record.smokes),
        daily_water_liters: record.daily_water_liters,
        monitors_calories: encode_yes_no(record.monitors_calories),
        physical_activity_days: record.physical_activity_days,
        screen_time_hours: record.screen_time_hours,
        alcohol_frequency: encode_frequency(record.alcohol_frequency),
        transport_mode: record.transport_mode.training_label(),
    };

    debug!(row = ?encoded.named_row(), "Encoded patient record");

    encoded
}
