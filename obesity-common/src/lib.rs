//! # Obesity Common Library
//!
//! Shared code for the obesity risk predictor:
//! - Patient record types and domain bounds
//! - Categorical feature encoder (the training-time encoding contract)
//! - Class index to label/advice/tier mapping
//! - Configuration loading
//! - Error types

pub mod assessment;
pub mod config;
pub mod encoder;
pub mod error;
pub mod record;

pub use assessment::{assess, Assessment, ClassIndex, Framing, Tier};
pub use encoder::{encode, EncodedFeatureVector, FeatureValue, CATEGORICAL_COLUMNS, FEATURE_COLUMNS};
pub use error::{Error, Result};
pub use record::PatientRecord;
