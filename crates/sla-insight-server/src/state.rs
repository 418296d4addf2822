use axum::extract::FromRef;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::analytics::AnalyticsService;
use crate::config::{Settings, SlaPolicy};
use crate::database::Database;
use crate::ingestion::IngestionService;
use crate::prediction::PredictionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub policy: Arc<SlaPolicy>,
    pub ingestion: Arc<IngestionService>,
    pub analytics: Arc<AnalyticsService>,
    pub prediction: Arc<PredictionService>,
    pub settings: Arc<Settings>,
    /// Held for the whole regenerate + ingest sequence.
    pub reingest_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(settings: Settings, database: Database, policy: SlaPolicy) -> Self {
        let policy = Arc::new(policy);

        Self {
            ingestion: Arc::new(IngestionService::new(
                database.clone(),
                policy.clone(),
                settings.ingestion.max_issues,
            )),
            analytics: Arc::new(AnalyticsService::new(database.clone())),
            prediction: Arc::new(PredictionService::new(
                database.clone(),
                settings.model.clone(),
            )),
            database,
            policy,
            settings: Arc::new(settings),
            reingest_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl FromRef<AppState> for Arc<AnalyticsService> {
    fn from_ref(state: &AppState) -> Self {
        state.analytics.clone()
    }
}

impl FromRef<AppState> for Arc<PredictionService> {
    fn from_ref(state: &AppState) -> Self {
        state.prediction.clone()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.database.clone()
    }
}
