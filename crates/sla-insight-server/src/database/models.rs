use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub region: String,
    pub plan: String,
    pub tenure_months: i64,
    pub employees: i64,
}

/// Ticket as persisted, after validation.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub customer_id: String,
    pub created_at: Option<String>,
    pub category: String,
    pub channel: String,
    pub priority: String,
    pub first_response_time_hours: Option<f64>,
    pub resolution_time_hours: Option<f64>,
    pub is_open: bool,
    pub breached_sla: bool,
    pub summary: String,
}

/// Ticket left-joined to its customer, as consumed by the overview.
#[derive(Debug, Clone, FromRow)]
pub struct OverviewRow {
    pub ticket_id: String,
    pub customer_id: String,
    pub created_at: Option<String>,
    pub category: String,
    pub priority: String,
    pub resolution_time_hours: Option<f64>,
    pub breached_sla: bool,
    /// `None` when the customer join failed.
    pub joined_customer_id: Option<String>,
}

impl OverviewRow {
    pub fn has_customer(&self) -> bool {
        self.joined_customer_id.is_some()
    }
}

/// Stored ticket matching at least one defect signature.
#[derive(Debug, Clone, FromRow)]
pub struct DefectRow {
    pub ticket_id: String,
    pub priority: Option<String>,
    pub created_at: Option<String>,
    pub first_response_time_hours: Option<f64>,
}

/// Ticket joined with customer attributes known at ticket creation.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TrainingRow {
    pub category: String,
    pub channel: String,
    pub priority: String,
    pub region: String,
    pub plan: String,
    pub tenure_months: i64,
    pub employees: i64,
    pub breached_sla: bool,
}
