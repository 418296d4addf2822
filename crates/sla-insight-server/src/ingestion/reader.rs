use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::IngestError;

/// Customer record exactly as read from the source; every field is text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCustomer {
    pub customer_id: String,
    pub region: String,
    pub plan: String,
    pub tenure_months: String,
    pub employees: String,
}

/// Ticket record exactly as read from the source; every field is text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTicket {
    pub ticket_id: String,
    pub customer_id: String,
    pub created_at: String,
    pub category: String,
    pub channel: String,
    pub priority: String,
    pub first_response_time_hours: String,
    pub resolution_time_hours: String,
    pub is_open: String,
    pub breached_sla: String,
    pub summary: String,
}

pub fn read_customers(path: &Path) -> Result<Vec<RawCustomer>, IngestError> {
    read_records(path)
}

pub fn read_tickets(path: &Path) -> Result<Vec<RawTicket>, IngestError> {
    read_records(path)
}

fn read_records<T>(path: &Path) -> Result<Vec<T>, IngestError>
where
    T: for<'de> Deserialize<'de>,
{
    let csv_err = |source: csv::Error| IngestError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let records = reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)?;

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}
