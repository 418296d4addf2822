use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::analytics::{AnalyticsService, OverviewFilters, OverviewReport};
use crate::utils::ApiError;

pub async fn overview_handler(
    State(analytics): State<Arc<AnalyticsService>>,
    Query(filters): Query<OverviewFilters>,
) -> Result<Json<OverviewReport>, ApiError> {
    let filters = filters.normalized();

    analytics
        .compute_overview(&filters)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound("No data found for the given filters".to_string())
        })
}
