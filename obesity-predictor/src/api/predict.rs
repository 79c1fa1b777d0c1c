//! Encoding and prediction endpoints
//!
//! One submission yields at most one prediction call. The record is
//! validated against its domain bounds here, at the HTTP boundary, because
//! requests can arrive without going through the form.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use obesity_common::{
    assess, encode, Assessment, EncodedFeatureVector, Error, FeatureValue, Framing, PatientRecord,
};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// One column of the encoded row
#[derive(Debug, Serialize)]
pub struct NamedFeature {
    pub column: &'static str,
    pub value: FeatureValue,
}

/// POST /api/encode response
#[derive(Debug, Serialize)]
pub struct EncodeResponse {
    pub encoded: EncodedFeatureVector,
    /// Encoded values in pipeline column order
    pub row: Vec<NamedFeature>,
}

/// POST /api/predict response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction_id: Uuid,
    #[serde(flatten)]
    pub assessment: Assessment,
    pub framing: Framing,
    pub encoded: EncodedFeatureVector,
    pub predicted_at: DateTime<Utc>,
}

/// Unwrap the JSON body and check domain bounds
fn accept_record(payload: Result<Json<PatientRecord>, JsonRejection>) -> ApiResult<PatientRecord> {
    let Json(record) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    record.validate()?;
    Ok(record)
}

/// POST /api/encode
///
/// Returns the encoded feature vector without running the model.
pub async fn encode_record(
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> ApiResult<Json<EncodeResponse>> {
    let record = accept_record(payload)?;
    let encoded = encode(&record);

    let row = encoded
        .named_row()
        .into_iter()
        .map(|(column, value)| NamedFeature { column, value })
        .collect();

    Ok(Json(EncodeResponse { encoded, row }))
}

/// POST /api/predict
///
/// Validates, encodes and classifies one record. Responds 503 without
/// calling the model when the artifact is unavailable.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let record = accept_record(payload)?;

    if !state.model.is_available() {
        warn!("Prediction requested while model is unavailable");
        return Err(ApiError::ModelUnavailable(
            state.framing.unavailable_message().to_string(),
        ));
    }

    // Tree traversal is CPU-bound; keep it off the async workers
    let model = state.model.clone();
    let encoded = encode(&record);
    let (outcome, encoded) = tokio::task::spawn_blocking(move || {
        let outcome = model.predict(&encoded);
        (outcome, encoded)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Inference task failed: {}", e)))?;

    let class_index = outcome.map_err(|e| match e {
        Error::ModelUnavailable(_) => {
            ApiError::ModelUnavailable(state.framing.unavailable_message().to_string())
        }
        other => ApiError::Common(other),
    })?;

    let assessment = assess(class_index, state.framing);
    if !assessment.is_known() {
        warn!("Model returned unmapped class index {}", class_index);
    }

    let prediction_id = Uuid::new_v4();
    info!(
        prediction_id = %prediction_id,
        class_index = class_index.0,
        label = assessment.label,
        "Prediction complete"
    );

    Ok(Json(PredictResponse {
        prediction_id,
        assessment,
        framing: state.framing,
        encoded,
        predicted_at: Utc::now(),
    }))
}
