//! obesity-predictor library
//!
//! Serves the assessment form, validates and encodes submissions, runs the
//! trained pipeline and renders the result. Exposed as a library for
//! integration testing.

pub mod api;
pub mod error;
pub mod model;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use model::ModelHandle;
use obesity_common::Framing;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Memoized model handle, loaded once at startup
    pub model: Arc<ModelHandle>,
    /// Copy register for page and advice text
    pub framing: Framing,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(model: Arc<ModelHandle>, framing: Framing) -> Self {
        Self {
            model,
            framing,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        // UI
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        // API
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/model", get(api::get_model_status))
        .route("/api/encode", post(api::encode_record))
        .route("/api/predict", post(api::predict))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
