use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sqlx::Connection;
use tracing::{info, warn};

use super::artifacts::{ArtifactStore, TrainedModel};
use super::classifier::{BinaryClassifier, BoostingParams, GradientBoostedClassifier};
use super::encoder::FeatureEncoders;
use super::evaluation::{confusion_matrix, f1_score, roc_auc, ModelMetrics};
use super::features::PredictionRequest;
use super::PredictionError;
use crate::config::ModelConfig;
use crate::database::{repository, Database, TrainingRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub label: u8,
}

#[derive(Clone)]
pub struct PredictionService {
    database: Database,
    store: ArtifactStore,
    config: ModelConfig,
}

impl PredictionService {
    pub fn new(database: Database, config: ModelConfig) -> Self {
        Self {
            database,
            store: ArtifactStore::new(&config),
            config,
        }
    }

    /// Fit on stored tickets, persist model, encoders and metrics.
    pub async fn train(&self) -> Result<ModelMetrics, PredictionError> {
        let mut conn = self.database.open().await?;
        let rows = repository::fetch_training_rows(&mut conn).await?;
        conn.close().await?;

        info!("Training on {} joined tickets", rows.len());

        let config = self.config.clone();
        let (model, metrics) = tokio::task::spawn_blocking(move || fit_and_evaluate(&rows, &config))
            .await
            .map_err(|e| PredictionError::Training(e.to_string()))??;

        self.store.save_model(&model).await?;
        self.store.save_metrics(&metrics).await?;

        info!(
            "Model trained: auc={:.4} f1={:.4} trees={}",
            metrics.auc,
            metrics.f1,
            model.classifier.trees().len()
        );
        Ok(metrics)
    }

    /// `Ok(None)` when no model has been trained yet.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<Option<Prediction>, PredictionError> {
        let Some(model) = self.store.load_model().await? else {
            return Ok(None);
        };

        let features = model.encoders.encode_request(request);
        let probability = model.classifier.predict_proba(&features);

        Ok(Some(Prediction {
            probability,
            label: u8::from(model.classifier.predict(&features)),
        }))
    }

    /// Persisted hold-out metrics. Re-trains when the model exists without them.
    pub async fn metrics(&self) -> Result<Option<ModelMetrics>, PredictionError> {
        if !self.store.model_exists().await {
            return Ok(None);
        }

        match self.store.load_metrics().await? {
            Some(metrics) => Ok(Some(metrics)),
            None => {
                warn!(
                    "Model present without metrics, re-training to regenerate them"
                );
                self.train().await.map(Some)
            }
        }
    }
}

/// Seeded shuffle split, fit, and hold-out evaluation.
pub fn fit_and_evaluate(
    rows: &[TrainingRow],
    config: &ModelConfig,
) -> Result<(TrainedModel, ModelMetrics), PredictionError> {
    let test_size = (rows.len() as f64 * config.test_fraction).ceil() as usize;
    if rows.len() < 2 || test_size == 0 || test_size >= rows.len() {
        return Err(PredictionError::InsufficientData(format!(
            "{} rows cannot be split for training",
            rows.len()
        )));
    }

    let mut indices: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);
    let (test_idx, train_idx) = indices.split_at(test_size);

    let encoders = FeatureEncoders::fit(rows);
    let encode = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<bool>) {
        idx.iter()
            .map(|&i| (encoders.encode_row(&rows[i]), rows[i].breached_sla))
            .unzip()
    };
    let (x_train, y_train) = encode(train_idx);
    let (x_test, y_test) = encode(test_idx);

    if y_train.iter().all(|&y| y) || y_train.iter().all(|&y| !y) {
        return Err(PredictionError::InsufficientData(
            "training labels contain a single class".to_string(),
        ));
    }

    let mut classifier = GradientBoostedClassifier::new(BoostingParams::from(config));
    classifier.fit(&x_train, &y_train)?;

    let scores: Vec<f64> = x_test.iter().map(|x| classifier.predict_proba(x)).collect();
    let predicted: Vec<bool> = scores.iter().map(|&p| p >= 0.5).collect();

    let auc = roc_auc(&y_test, &scores).ok_or_else(|| {
        PredictionError::InsufficientData("evaluation split contains a single class".to_string())
    })?;

    let metrics = ModelMetrics {
        auc,
        f1: f1_score(&y_test, &predicted),
        confusion_matrix: confusion_matrix(&y_test, &predicted),
    };

    Ok((
        TrainedModel {
            classifier,
            encoders,
        },
        metrics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_rows(n: usize) -> Vec<TrainingRow> {
        let priorities = ["low", "medium", "high", "urgent"];
        (0..n)
            .map(|i| {
                let priority = priorities[i % 4];
                TrainingRow {
                    category: if i % 3 == 0 { "Security" } else { "Billing" }.to_string(),
                    channel: if i % 2 == 0 { "email" } else { "phone" }.to_string(),
                    priority: priority.to_string(),
                    region: "EU".to_string(),
                    plan: if i % 5 == 0 { "free" } else { "enterprise" }.to_string(),
                    tenure_months: (i % 24) as i64,
                    employees: 10 + i as i64,
                    breached_sla: priority == "urgent",
                }
            })
            .collect()
    }

    fn small_config() -> ModelConfig {
        ModelConfig {
            n_estimators: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_fit_and_evaluate_reports_metrics() {
        let rows = training_rows(200);
        let (model, metrics) = fit_and_evaluate(&rows, &small_config()).unwrap();

        let total: u64 = metrics.confusion_matrix.iter().flatten().sum();
        assert_eq!(total, 40);
        assert!(metrics.auc > 0.9);
        assert!((0.0..=1.0).contains(&metrics.f1));
        assert_eq!(model.encoders.priority.classes().len(), 4);
    }

    #[test]
    fn test_split_is_reproducible() {
        let rows = training_rows(120);
        let (_, a) = fit_and_evaluate(&rows, &small_config()).unwrap();
        let (_, b) = fit_and_evaluate(&rows, &small_config()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_is_insufficient() {
        let mut rows = training_rows(50);
        for row in rows.iter_mut() {
            row.breached_sla = false;
        }
        let err = fit_and_evaluate(&rows, &small_config()).unwrap_err();
        assert!(matches!(err, PredictionError::InsufficientData(_)));
    }

    #[test]
    fn test_too_few_rows_is_insufficient() {
        let err = fit_and_evaluate(&training_rows(1), &small_config()).unwrap_err();
        assert!(matches!(err, PredictionError::InsufficientData(_)));
        let err = fit_and_evaluate(&[], &small_config()).unwrap_err();
        assert!(matches!(err, PredictionError::InsufficientData(_)));
    }
}
