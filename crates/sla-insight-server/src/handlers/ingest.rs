use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::generator;
use crate::ingestion::{scan_diagnostics, DiagnosticsReport, DiagnosticsSnapshot};
use crate::state::AppState;
use crate::utils::ApiError;

#[derive(Serialize)]
pub struct ReingestResponse {
    pub status: String,
    pub diagnostics: DiagnosticsReport,
}

#[derive(Serialize)]
pub struct DiagnosticsResponse {
    #[serde(flatten)]
    pub snapshot: DiagnosticsSnapshot,
    pub status: String,
}

/// Regenerate the CSV sources, then replace stored data with them.
pub async fn reingest_handler(
    State(state): State<AppState>,
) -> Result<Json<ReingestResponse>, ApiError> {
    let _guard = state.reingest_lock.lock().await;

    generator::regenerate(&state.settings.generator).await?;

    let data = &state.settings.data;
    let diagnostics = state
        .ingestion
        .ingest_files(&data.customers_csv, &data.tickets_csv)
        .await?;

    info!(
        "Re-ingest finished with {} dirty rows",
        diagnostics.dirty_rows
    );

    Ok(Json(ReingestResponse {
        status: "Data regenerated and ingested".to_string(),
        diagnostics,
    }))
}

pub async fn diagnostics_handler(
    State(state): State<AppState>,
) -> Result<Json<DiagnosticsResponse>, ApiError> {
    let snapshot = scan_diagnostics(&state.database, &state.policy).await?;

    Ok(Json(DiagnosticsResponse {
        snapshot,
        status: "success".to_string(),
    }))
}
