use serde::{Deserialize, Serialize};

use super::encoder::FeatureEncoders;
use crate::database::TrainingRow;

/// Column order of every feature vector.
pub const FEATURES: [&str; 7] = [
    "category",
    "channel",
    "priority",
    "region",
    "plan",
    "tenure_months",
    "employees",
];

const UNKNOWN: &str = "unknown";

/// Attributes of a ticket at creation time. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub category: Option<String>,
    pub channel: Option<String>,
    pub priority: Option<String>,
    pub region: Option<String>,
    pub plan: Option<String>,
    pub tenure_months: Option<f64>,
    pub employees: Option<f64>,
}

impl FeatureEncoders {
    /// Encode a stored training row. Values are always in the vocabulary here.
    pub fn encode_row(&self, row: &TrainingRow) -> Vec<f64> {
        vec![
            self.category.transform_or_first(&row.category) as f64,
            self.channel.transform_or_first(&row.channel) as f64,
            self.priority.transform_or_first(&row.priority) as f64,
            self.region.transform_or_first(&row.region) as f64,
            self.plan.transform_or_first(&row.plan) as f64,
            row.tenure_months as f64,
            row.employees as f64,
        ]
    }

    pub fn encode_request(&self, request: &PredictionRequest) -> Vec<f64> {
        let text = |value: &Option<String>| value.as_deref().unwrap_or(UNKNOWN).to_string();

        vec![
            self.category.transform_or_first(&text(&request.category)) as f64,
            self.channel.transform_or_first(&text(&request.channel)) as f64,
            self.priority.transform_or_first(&text(&request.priority)) as f64,
            self.region.transform_or_first(&text(&request.region)) as f64,
            self.plan.transform_or_first(&text(&request.plan)) as f64,
            request.tenure_months.unwrap_or(0.0),
            request.employees.unwrap_or(0.0),
        ]
    }
}
