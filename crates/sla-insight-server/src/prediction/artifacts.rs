use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::classifier::GradientBoostedClassifier;
use super::encoder::FeatureEncoders;
use super::evaluation::ModelMetrics;
use super::PredictionError;
use crate::config::ModelConfig;

/// Everything `predict` needs, loaded together.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub classifier: GradientBoostedClassifier,
    pub encoders: FeatureEncoders,
}

/// JSON files for the model, its encoders and its hold-out metrics.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    model_path: PathBuf,
    encoders_path: PathBuf,
    metrics_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            encoders_path: config.encoders_path.clone(),
            metrics_path: config.metrics_path.clone(),
        }
    }

    pub async fn model_exists(&self) -> bool {
        exists(&self.model_path).await && exists(&self.encoders_path).await
    }

    pub async fn save_model(&self, model: &TrainedModel) -> Result<(), PredictionError> {
        write_json(&self.model_path, &model.classifier).await?;
        write_json(&self.encoders_path, &model.encoders).await
    }

    /// `Ok(None)` when either file is missing.
    pub async fn load_model(&self) -> Result<Option<TrainedModel>, PredictionError> {
        if !self.model_exists().await {
            return Ok(None);
        }

        Ok(Some(TrainedModel {
            classifier: read_json(&self.model_path).await?,
            encoders: read_json(&self.encoders_path).await?,
        }))
    }

    pub async fn save_metrics(&self, metrics: &ModelMetrics) -> Result<(), PredictionError> {
        write_json(&self.metrics_path, metrics).await
    }

    pub async fn load_metrics(&self) -> Result<Option<ModelMetrics>, PredictionError> {
        if !exists(&self.metrics_path).await {
            return Ok(None);
        }
        Ok(Some(read_json(&self.metrics_path).await?))
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PredictionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec(value)?;
    tokio::fs::write(path, bytes).await?;
    debug!("Wrote artifact {}", path.display());
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PredictionError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
