//! Ingestion pipeline: raw records → validated rows → storage.

pub mod diagnostics;
pub mod pipeline;
pub mod reader;
pub mod validator;

use thiserror::Error;

pub use diagnostics::{scan_diagnostics, DiagnosticsSnapshot};
pub use pipeline::{DiagnosticsReport, IngestionService};
pub use reader::{RawCustomer, RawTicket};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Customer {customer_id}: invalid {field} '{value}'")]
    InvalidCustomer {
        customer_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Ticket {ticket_id}: invalid {field} '{value}'")]
    InvalidTicket {
        ticket_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Background task failed: {0}")]
    Task(String),
}
