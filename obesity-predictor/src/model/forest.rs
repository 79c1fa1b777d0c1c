//! Random forest pipeline artifact
//!
//! The trained pipeline is shipped as JSON produced by the training process:
//! a column schema, one-hot vocabularies for categorical columns, optional
//! derived columns, and a list of decision trees over the expanded layout.
//!
//! Expanded layout: each numeric column in schema order, each categorical
//! column replaced in place by its one-hot block, then derived columns.
//! Splits go left when `value <= threshold`. The predicted class is the
//! majority vote over all trees (ties go to the lowest class index).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use obesity_common::assessment::CLASS_COUNT;
use obesity_common::{ClassIndex, EncodedFeatureVector, Error, Result};
use obesity_common::{CATEGORICAL_COLUMNS, FEATURE_COLUMNS};

use super::{Classifier, ModelInfo};

pub const FORMAT_TAG: &str = "obesity-forest/v1";

/// Columns the pipeline computes from the encoded row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DerivedColumn {
    /// Weight / Height²
    #[serde(rename = "BMI")]
    Bmi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: u32,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// On-disk artifact, exactly as deserialized
#[derive(Debug, Clone, Deserialize)]
pub struct ForestArtifact {
    pub format: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub derived: Vec<DerivedColumn>,
    pub classes: u32,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone)]
enum Slot {
    Numeric { column: usize },
    OneHot { column: usize, categories: Vec<String> },
}

/// Validated, ready-to-score forest
#[derive(Debug, Clone)]
pub struct ForestPipeline {
    slots: Vec<Slot>,
    derived: Vec<DerivedColumn>,
    width: usize,
    classes: u32,
    trees: Vec<Tree>,
    source: Option<String>,
}

impl ForestPipeline {
    /// Read and validate an artifact file
    ///
    /// # Errors
    /// - `Error::ModelUnavailable` if the file cannot be read or is not JSON
    /// - `Error::ModelFormat` if it does not describe a usable forest
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::ModelUnavailable(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let artifact: ForestArtifact = serde_json::from_slice(&bytes).map_err(|e| {
            Error::ModelUnavailable(format!("Cannot deserialize {}: {}", path.display(), e))
        })?;

        let mut pipeline = Self::from_artifact(artifact)?;
        pipeline.source = Some(path.display().to_string());
        Ok(pipeline)
    }

    /// Validate an in-memory artifact
    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self> {
        if artifact.format != FORMAT_TAG {
            return Err(Error::ModelFormat(format!(
                "Unsupported format '{}' (expected '{}')",
                artifact.format, FORMAT_TAG
            )));
        }

        if artifact.columns.iter().map(String::as_str).ne(FEATURE_COLUMNS.iter().copied()) {
            return Err(Error::ModelFormat(format!(
                "Column schema mismatch: artifact has {:?}",
                artifact.columns
            )));
        }

        for name in artifact.categories.keys() {
            if !CATEGORICAL_COLUMNS.contains(&name.as_str()) {
                return Err(Error::ModelFormat(format!(
                    "Categories given for non-categorical column '{}'",
                    name
                )));
            }
        }

        let mut slots = Vec::with_capacity(FEATURE_COLUMNS.len());
        let mut width = 0;
        for (column, name) in FEATURE_COLUMNS.iter().enumerate() {
            if CATEGORICAL_COLUMNS.contains(name) {
                let categories = artifact
                    .categories
                    .get(*name)
                    .filter(|c| !c.is_empty())
                    .cloned()
                    .ok_or_else(|| {
                        Error::ModelFormat(format!("No categories for column '{}'", name))
                    })?;
                width += categories.len();
                slots.push(Slot::OneHot { column, categories });
            } else {
                width += 1;
                slots.push(Slot::Numeric { column });
            }
        }
        width += artifact.derived.len();

        if artifact.classes == 0 {
            return Err(Error::ModelFormat("Artifact declares zero classes".to_string()));
        }
        // Vote buffers are sized by the class count
        if artifact.classes as usize > CLASS_COUNT {
            return Err(Error::ModelFormat(format!(
                "Artifact declares {} classes, at most {} are supported",
                artifact.classes, CLASS_COUNT
            )));
        }
        if artifact.trees.is_empty() {
            return Err(Error::ModelFormat("Artifact contains no trees".to_string()));
        }
        for (t, tree) in artifact.trees.iter().enumerate() {
            validate_tree(t, tree, width, artifact.classes)?;
        }

        Ok(Self {
            slots,
            derived: artifact.derived,
            width,
            classes: artifact.classes,
            trees: artifact.trees,
            source: None,
        })
    }

    /// Width of the expanded input row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Apply one-hot expansion and derived columns
    pub fn expand(&self, features: &EncodedFeatureVector) -> Result<Vec<f64>> {
        let row = features.row();
        let mut expanded = Vec::with_capacity(self.width);

        for slot in &self.slots {
            match slot {
                Slot::Numeric { column } => {
                    let value = row[*column].as_number().ok_or_else(|| {
                        Error::Inference(format!(
                            "Column '{}' is categorical, expected a number",
                            FEATURE_COLUMNS[*column]
                        ))
                    })?;
                    expanded.push(value);
                }
                Slot::OneHot { column, categories } => {
                    let label = row[*column].as_category().ok_or_else(|| {
                        Error::Inference(format!(
                            "Column '{}' is numeric, expected a category",
                            FEATURE_COLUMNS[*column]
                        ))
                    })?;
                    // Unknown labels expand to an all-zero block
                    expanded.extend(
                        categories
                            .iter()
                            .map(|c| if c == label { 1.0 } else { 0.0 }),
                    );
                }
            }
        }

        for derived in &self.derived {
            match derived {
                DerivedColumn::Bmi => {
                    expanded.push(features.weight / (features.height * features.height))
                }
            }
        }

        Ok(expanded)
    }

    fn vote(&self, x: &[f64]) -> ClassIndex {
        let mut counts = vec![0u32; self.classes as usize];
        for tree in &self.trees {
            counts[traverse(tree, x) as usize] += 1;
        }

        let mut best = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = class;
            }
        }
        ClassIndex(best as u32)
    }
}

impl Classifier for ForestPipeline {
    fn predict(&self, features: &EncodedFeatureVector) -> Result<ClassIndex> {
        let x = self.expand(features)?;
        Ok(self.vote(&x))
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            kind: "random_forest".to_string(),
            format: FORMAT_TAG.to_string(),
            classes: self.classes as usize,
            trees: self.trees.len(),
            source: self.source.clone(),
        }
    }
}

/// Children must come after their parent, which rules out cycles
fn validate_tree(index: usize, tree: &Tree, width: usize, classes: u32) -> Result<()> {
    if tree.nodes.is_empty() {
        return Err(Error::ModelFormat(format!("Tree {} has no nodes", index)));
    }

    for (n, node) in tree.nodes.iter().enumerate() {
        match *node {
            Node::Split {
                feature,
                left,
                right,
                ..
            } => {
                if feature >= width {
                    return Err(Error::ModelFormat(format!(
                        "Tree {} node {}: feature {} outside row width {}",
                        index, n, feature, width
                    )));
                }
                for child in [left, right] {
                    if child <= n || child >= tree.nodes.len() {
                        return Err(Error::ModelFormat(format!(
                            "Tree {} node {}: invalid child index {}",
                            index, n, child
                        )));
                    }
                }
            }
            Node::Leaf { class } => {
                if class >= classes {
                    return Err(Error::ModelFormat(format!(
                        "Tree {} node {}: class {} outside {} classes",
                        index, n, class, classes
                    )));
                }
            }
        }
    }
    Ok(())
}

fn traverse(tree: &Tree, x: &[f64]) -> u32 {
    let mut n = 0;
    loop {
        match tree.nodes[n] {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => n = if x[feature] <= threshold { left } else { right },
            Node::Leaf { class } => return class,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use obesity_common::encoder::encode;
    use obesity_common::record::{
        Frequency, Gender, PatientRecord, TransportMode, VegetableFrequency, YesNo,
    };
    use serde_json::json;

    const MTRANS: [&str; 5] = ["Automobile", "Bike", "Motorbike", "Public_Transportation", "Walking"];

    /// Minimal valid artifact whose only tree is a single leaf
    pub fn single_leaf_artifact(class: u32) -> String {
        json!({
            "format": FORMAT_TAG,
            "columns": FEATURE_COLUMNS,
            "categories": { "MTRANS": MTRANS },
            "classes": 7,
            "trees": [ { "nodes": [ { "kind": "leaf", "class": class } ] } ]
        })
        .to_string()
    }

    fn artifact(value: serde_json::Value) -> ForestArtifact {
        serde_json::from_value(value).unwrap()
    }

    fn base(trees: serde_json::Value) -> serde_json::Value {
        json!({
            "format": FORMAT_TAG,
            "columns": FEATURE_COLUMNS,
            "categories": { "MTRANS": MTRANS },
            "derived": ["BMI"],
            "classes": 7,
            "trees": trees
        })
    }

    fn record(height: f64, weight: f64, transport: TransportMode) -> EncodedFeatureVector {
        encode(&PatientRecord {
            gender: Gender::Woman,
            age: 30,
            height,
            weight,
            family_history_overweight: YesNo::No,
            eats_caloric_food: YesNo::Yes,
            vegetable_frequency: VegetableFrequency::Always,
            meals_per_day: 3,
            eats_between_meals: Frequency::Sometimes,
            smokes: YesNo::No,
            daily_water_liters: 2.0,
            monitors_calories: YesNo::No,
            physical_activity_days: 2,
            screen_time_hours: 3,
            alcohol_frequency: Frequency::Never,
            transport_mode: transport,
        })
    }

    #[test]
    fn test_expanded_layout() {
        let pipeline = ForestPipeline::from_artifact(artifact(base(json!([
            { "nodes": [ { "kind": "leaf", "class": 0 } ] }
        ]))))
        .unwrap();

        // 15 numeric + 5 one-hot + BMI
        assert_eq!(pipeline.width(), 21);

        let x = pipeline.expand(&record(2.0, 80.0, TransportMode::Bicycle)).unwrap();
        assert_eq!(x.len(), 21);
        assert_eq!(x[0], 1.0); // Gender
        assert_eq!(x[3], 80.0); // Weight
        assert_eq!(&x[15..20], &[0.0, 1.0, 0.0, 0.0, 0.0]); // Bike
        assert_eq!(x[20], 20.0); // BMI
    }

    #[test]
    fn test_unknown_category_expands_to_zeros() {
        let mut value = base(json!([{ "nodes": [ { "kind": "leaf", "class": 0 } ] }]));
        value["categories"]["MTRANS"] = json!(["Automobile", "Walking"]);
        let pipeline = ForestPipeline::from_artifact(artifact(value)).unwrap();

        let x = pipeline.expand(&record(1.7, 60.0, TransportMode::Bicycle)).unwrap();
        assert_eq!(&x[15..17], &[0.0, 0.0]);
    }

    #[test]
    fn test_split_on_one_hot_column() {
        // Feature 18 is the Public_Transportation indicator
        let pipeline = ForestPipeline::from_artifact(artifact(base(json!([
            { "nodes": [
                { "kind": "split", "feature": 18, "threshold": 0.5, "left": 1, "right": 2 },
                { "kind": "leaf", "class": 1 },
                { "kind": "leaf", "class": 5 }
            ] }
        ]))))
        .unwrap();

        let by_bus = pipeline.predict(&record(1.7, 60.0, TransportMode::PublicTransport)).unwrap();
        let by_car = pipeline.predict(&record(1.7, 60.0, TransportMode::Car)).unwrap();
        assert_eq!(by_bus, ClassIndex(5));
        assert_eq!(by_car, ClassIndex(1));
    }

    #[test]
    fn test_majority_vote_and_tie_break() {
        let leaf = |c: u32| json!({ "nodes": [ { "kind": "leaf", "class": c } ] });

        let majority = ForestPipeline::from_artifact(artifact(base(json!([leaf(4), leaf(2), leaf(4)])))).unwrap();
        assert_eq!(majority.predict(&record(1.7, 60.0, TransportMode::Car)).unwrap(), ClassIndex(4));

        let tie = ForestPipeline::from_artifact(artifact(base(json!([leaf(6), leaf(3)])))).unwrap();
        assert_eq!(tie.predict(&record(1.7, 60.0, TransportMode::Car)).unwrap(), ClassIndex(3));
    }

    #[test]
    fn test_rejects_wrong_format_tag() {
        let mut value = base(json!([{ "nodes": [ { "kind": "leaf", "class": 0 } ] }]));
        value["format"] = json!("sklearn-pickle");
        assert!(matches!(
            ForestPipeline::from_artifact(artifact(value)),
            Err(Error::ModelFormat(_))
        ));
    }

    #[test]
    fn test_rejects_column_mismatch() {
        let mut value = base(json!([{ "nodes": [ { "kind": "leaf", "class": 0 } ] }]));
        value["columns"] = json!(["Gender", "Age"]);
        assert!(matches!(
            ForestPipeline::from_artifact(artifact(value)),
            Err(Error::ModelFormat(_))
        ));
    }

    #[test]
    fn test_rejects_missing_categories() {
        let mut value = base(json!([{ "nodes": [ { "kind": "leaf", "class": 0 } ] }]));
        value["categories"] = json!({});
        assert!(ForestPipeline::from_artifact(artifact(value)).is_err());
    }

    #[test]
    fn test_rejects_backward_child() {
        let value = base(json!([
            { "nodes": [
                { "kind": "split", "feature": 20, "threshold": 25.0, "left": 0, "right": 1 },
                { "kind": "leaf", "class": 1 }
            ] }
        ]));
        assert!(ForestPipeline::from_artifact(artifact(value)).is_err());
    }

    #[test]
    fn test_rejects_feature_out_of_range() {
        let value = base(json!([
            { "nodes": [
                { "kind": "split", "feature": 21, "threshold": 25.0, "left": 1, "right": 2 },
                { "kind": "leaf", "class": 1 },
                { "kind": "leaf", "class": 2 }
            ] }
        ]));
        assert!(ForestPipeline::from_artifact(artifact(value)).is_err());
    }

    #[test]
    fn test_rejects_leaf_class_out_of_range() {
        let value = base(json!([{ "nodes": [ { "kind": "leaf", "class": 7 } ] }]));
        assert!(ForestPipeline::from_artifact(artifact(value)).is_err());
    }

    #[test]
    fn test_rejects_excessive_class_count() {
        let mut value = base(json!([{ "nodes": [ { "kind": "leaf", "class": 0 } ] }]));
        value["classes"] = json!(u32::MAX);
        match ForestPipeline::from_artifact(artifact(value.clone())) {
            Err(Error::ModelFormat(msg)) => assert!(msg.contains("at most 7")),
            other => panic!("Expected ModelFormat, got {:?}", other),
        }

        value["classes"] = json!(8);
        assert!(ForestPipeline::from_artifact(artifact(value)).is_err());
    }

    #[test]
    fn test_rejects_empty_forest() {
        assert!(ForestPipeline::from_artifact(artifact(base(json!([])))).is_err());
    }

    #[test]
    fn test_describe() {
        let pipeline = ForestPipeline::from_artifact(artifact(base(json!([
            { "nodes": [ { "kind": "leaf", "class": 0 } ] },
            { "nodes": [ { "kind": "leaf", "class": 1 } ] }
        ]))))
        .unwrap();
        let info = pipeline.describe();
        assert_eq!(info.kind, "random_forest");
        assert_eq!(info.trees, 2);
        assert_eq!(info.classes, 7);
        assert!(info.source.is_none());
    }
}
