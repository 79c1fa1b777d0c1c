//! Model status endpoint

use axum::{extract::State, Json};

use crate::model::ModelStatus;
use crate::AppState;

/// GET /api/model
///
/// Reports whether the pipeline loaded; the form uses this to disable
/// submission when it did not.
pub async fn get_model_status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.model.status())
}
