use serde::{Deserialize, Serialize};
use sqlx::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::reader::{self, RawCustomer, RawTicket};
use super::validator::{validate_date, validate_float, validate_priority};
use super::IngestError;
use crate::config::SlaPolicy;
use crate::database::{connection, repository, Customer, Database, Ticket};

/// Outcome of one full-replace ingestion batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub customers_ingested: usize,
    pub tickets_ingested: usize,
    pub dirty_rows: usize,
    pub issues: Vec<String>,
}

/// A ticket ready for storage plus the issues raised while cleaning it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTicket {
    pub ticket: Ticket,
    pub issues: Vec<String>,
}

impl ValidatedTicket {
    pub fn is_dirty(&self) -> bool {
        !self.issues.is_empty()
    }
}

pub fn coerce_customer(raw: &RawCustomer) -> Result<Customer, IngestError> {
    let int_field = |field: &'static str, value: &str| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| IngestError::InvalidCustomer {
                customer_id: raw.customer_id.clone(),
                field,
                value: value.to_string(),
            })
    };

    Ok(Customer {
        customer_id: raw.customer_id.clone(),
        region: raw.region.clone(),
        plan: raw.plan.clone(),
        tenure_months: int_field("tenure_months", &raw.tenure_months)?,
        employees: int_field("employees", &raw.employees)?,
    })
}

/// Run the date, priority and float validators over one raw ticket.
pub fn validate_ticket(
    raw: &RawTicket,
    policy: &SlaPolicy,
) -> Result<ValidatedTicket, IngestError> {
    let mut issues = Vec::new();

    let created_at = validate_date(&raw.created_at);
    if created_at.is_none() {
        issues.push(format!(
            "Ticket {}: Invalid/Missing created_at",
            raw.ticket_id
        ));
    }

    let priority = validate_priority(&raw.priority, policy);
    if !priority.valid {
        issues.push(format!(
            "Ticket {}: Invalid priority '{}'",
            raw.ticket_id, raw.priority
        ));
    }

    let first_response = validate_float(&raw.first_response_time_hours);
    if first_response.is_none() {
        issues.push(format!(
            "Ticket {}: Missing first_response_time_hours",
            raw.ticket_id
        ));
    }

    // Null resolution means the ticket is still open, not a defect.
    let resolution = validate_float(&raw.resolution_time_hours);

    let ticket = Ticket {
        ticket_id: raw.ticket_id.clone(),
        customer_id: raw.customer_id.clone(),
        created_at,
        category: raw.category.clone(),
        channel: raw.channel.clone(),
        priority: priority.stored,
        first_response_time_hours: first_response,
        resolution_time_hours: resolution,
        is_open: parse_flag(&raw.ticket_id, "is_open", &raw.is_open)?,
        breached_sla: parse_flag(&raw.ticket_id, "breached_sla", &raw.breached_sla)?,
        summary: raw.summary.clone(),
    };

    Ok(ValidatedTicket { ticket, issues })
}

fn parse_flag(ticket_id: &str, field: &'static str, value: &str) -> Result<bool, IngestError> {
    match value.trim() {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        _ => Err(IngestError::InvalidTicket {
            ticket_id: ticket_id.to_string(),
            field,
            value: value.to_string(),
        }),
    }
}

pub struct IngestionService {
    database: Database,
    policy: Arc<SlaPolicy>,
    max_issues: usize,
}

impl IngestionService {
    pub fn new(database: Database, policy: Arc<SlaPolicy>, max_issues: usize) -> Self {
        Self {
            database,
            policy,
            max_issues,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Read both CSV sources and ingest them as one batch.
    pub async fn ingest_files(
        &self,
        customers_csv: &Path,
        tickets_csv: &Path,
    ) -> Result<DiagnosticsReport, IngestError> {
        let customers_path = customers_csv.to_path_buf();
        let tickets_path = tickets_csv.to_path_buf();

        let (customers, tickets) = tokio::task::spawn_blocking(move || {
            Ok::<_, IngestError>((
                reader::read_customers(&customers_path)?,
                reader::read_tickets(&tickets_path)?,
            ))
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))??;

        self.ingest(&customers, &tickets).await
    }

    /// Replace all stored customers and tickets with the given records.
    ///
    /// Everything runs in one transaction committed after the last row; an
    /// error before that point leaves the previous data intact.
    pub async fn ingest(
        &self,
        customers: &[RawCustomer],
        tickets: &[RawTicket],
    ) -> Result<DiagnosticsReport, IngestError> {
        info!(
            "Ingesting {} customers and {} tickets",
            customers.len(),
            tickets.len()
        );

        let mut conn = self.database.open().await?;
        let mut tx = conn.begin().await?;

        connection::create_tables(&mut *tx).await?;
        repository::reset(&mut *tx).await?;

        let mut report = DiagnosticsReport::default();

        for raw in customers {
            let customer = coerce_customer(raw)?;
            repository::upsert_customer(&mut *tx, &customer).await?;
            report.customers_ingested += 1;
        }

        for raw in tickets {
            let validated = validate_ticket(raw, &self.policy)?;
            if validated.is_dirty() {
                report.dirty_rows += 1;
                for issue in validated.issues {
                    if report.issues.len() < self.max_issues {
                        report.issues.push(issue);
                    }
                }
            }

            repository::upsert_ticket(&mut *tx, &validated.ticket).await?;
            report.tickets_ingested += 1;
        }

        tx.commit().await?;
        conn.close().await?;

        if report.dirty_rows > 0 {
            warn!(
                "Ingestion found {} dirty rows out of {} tickets",
                report.dirty_rows, report.tickets_ingested
            );
        }
        debug!("Issue list holds {} entries", report.issues.len());
        info!(
            "Ingestion complete: customers={}, tickets={}, dirty={}",
            report.customers_ingested, report.tickets_ingested, report.dirty_rows
        );

        Ok(report)
    }
}
