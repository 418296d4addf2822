//! SLA-breach prediction: feature encoding, boosted-tree classifier, artifacts.

pub mod artifacts;
pub mod classifier;
pub mod encoder;
pub mod evaluation;
pub mod features;
pub mod service;

use thiserror::Error;

pub use artifacts::{ArtifactStore, TrainedModel};
pub use classifier::{BinaryClassifier, BoostingParams, GradientBoostedClassifier};
pub use encoder::{FeatureEncoders, LabelEncoder};
pub use evaluation::ModelMetrics;
pub use features::{PredictionRequest, FEATURES};
pub use service::{Prediction, PredictionService};

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
