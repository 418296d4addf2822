use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::prediction::{ModelMetrics, Prediction, PredictionRequest, PredictionService};
use crate::utils::ApiError;

#[derive(Serialize)]
pub struct TrainResponse {
    pub status: String,
    pub metrics: ModelMetrics,
}

pub async fn train_handler(
    State(prediction): State<Arc<PredictionService>>,
) -> Result<Json<TrainResponse>, ApiError> {
    let metrics = prediction.train().await?;

    Ok(Json(TrainResponse {
        status: "Model trained".to_string(),
        metrics,
    }))
}

pub async fn metrics_handler(
    State(prediction): State<Arc<PredictionService>>,
) -> Result<Json<ModelMetrics>, ApiError> {
    prediction
        .metrics()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Model not trained yet".to_string()))
}

pub async fn predict_handler(
    State(prediction): State<Arc<PredictionService>>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<Prediction>, ApiError> {
    prediction
        .predict(&request)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::BadRequest("Model not available".to_string()))
}
