//! Predictor adapter
//!
//! Owns the lifetime of the externally trained pipeline. The artifact is
//! loaded at most once per process and is read-only afterwards, so the
//! handle can be shared across request handlers without locking.
//!
//! A missing or corrupt artifact puts the handle into the unavailable state;
//! `predict` then fails with `Error::ModelUnavailable` without touching any
//! classifier.

pub mod forest;

use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use obesity_common::assessment::CLASS_COUNT;
use obesity_common::{ClassIndex, EncodedFeatureVector, Error, Result};

pub use forest::ForestPipeline;

/// Narrow seam to the opaque trained pipeline
///
/// Implementations own any preprocessing (one-hot, derived columns); the
/// adapter hands over the encoded row untouched.
pub trait Classifier: Send + Sync {
    /// Score one encoded row
    fn predict(&self, features: &EncodedFeatureVector) -> Result<ClassIndex>;

    /// Descriptive metadata for status reporting
    fn describe(&self) -> ModelInfo;
}

/// Metadata about a loaded model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub kind: String,
    pub format: String,
    pub classes: usize,
    pub trees: usize,
    /// Artifact path, when loaded from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Model availability as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ModelStatus {
    Available { model: ModelInfo },
    Unavailable { reason: String },
}

enum ModelState {
    Ready(Arc<dyn Classifier>),
    Unavailable(String),
}

/// Memoized handle to the trained pipeline
///
/// Constructed once at startup and passed to handlers by reference.
pub struct ModelHandle {
    path: Option<PathBuf>,
    state: OnceCell<ModelState>,
}

impl ModelHandle {
    /// Handle that loads the artifact at `path` on first use
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            state: OnceCell::new(),
        }
    }

    /// Handle wrapping an already constructed classifier
    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            path: None,
            state: OnceCell::with_value(ModelState::Ready(classifier)),
        }
    }

    /// Handle that is permanently unavailable
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            path: None,
            state: OnceCell::with_value(ModelState::Unavailable(reason.into())),
        }
    }

    /// Force the load now (normally called at startup)
    ///
    /// Subsequent calls return the memoized result.
    pub fn load(&self) -> ModelStatus {
        self.status()
    }

    pub fn status(&self) -> ModelStatus {
        match self.state() {
            ModelState::Ready(classifier) => ModelStatus::Available {
                model: classifier.describe(),
            },
            ModelState::Unavailable(reason) => ModelStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state(), ModelState::Ready(_))
    }

    /// Run the pipeline on one encoded row
    ///
    /// # Errors
    /// - `Error::ModelUnavailable` when the artifact could not be loaded
    /// - any error raised by the classifier itself
    pub fn predict(&self, features: &EncodedFeatureVector) -> Result<ClassIndex> {
        match self.state() {
            ModelState::Ready(classifier) => classifier.predict(features),
            ModelState::Unavailable(reason) => Err(Error::ModelUnavailable(reason.clone())),
        }
    }

    fn state(&self) -> &ModelState {
        self.state.get_or_init(|| match &self.path {
            Some(path) => load_state(path),
            None => ModelState::Unavailable("No model artifact configured".to_string()),
        })
    }
}

fn load_state(path: &Path) -> ModelState {
    match ForestPipeline::load(path) {
        Ok(pipeline) => {
            let model = pipeline.describe();
            info!(
                "Loaded model artifact {} ({} trees, {} classes)",
                path.display(),
                model.trees,
                model.classes
            );
            if model.classes < CLASS_COUNT {
                warn!(
                    "Model declares {} classes, only those of the {} labelled ones are reachable",
                    model.classes, CLASS_COUNT
                );
            }
            ModelState::Ready(Arc::new(pipeline))
        }
        Err(e) => {
            warn!("Model unavailable, predictions disabled: {}", e);
            ModelState::Unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Classifier returning a fixed class and counting calls
    pub struct StubClassifier {
        pub class: ClassIndex,
        pub calls: AtomicUsize,
    }

    impl StubClassifier {
        pub fn new(class: u32) -> Self {
            Self {
                class: ClassIndex(class),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Classifier for StubClassifier {
        fn predict(&self, _features: &EncodedFeatureVector) -> Result<ClassIndex> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.class)
        }

        fn describe(&self) -> ModelInfo {
            ModelInfo {
                kind: "stub".to_string(),
                format: "none".to_string(),
                classes: 7,
                trees: 0,
                source: None,
            }
        }
    }
}
