use serde::{Deserialize, Serialize};
use sqlx::Connection;
use tracing::debug;

use super::IngestError;
use crate::config::SlaPolicy;
use crate::database::{repository, Database, DefectRow};

/// Issues returned by a stored-data scan are truncated to this many entries.
pub const DIAGNOSTICS_ISSUE_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub customer_count: i64,
    pub ticket_count: i64,
    pub dirty_count: usize,
    pub issues: Vec<String>,
}

/// Re-scan stored tickets for the three defect signatures.
///
/// Lighter than ingestion: one combined query over what is already stored,
/// no re-validation of raw values.
pub async fn scan_diagnostics(
    database: &Database,
    policy: &SlaPolicy,
) -> Result<DiagnosticsSnapshot, IngestError> {
    let mut conn = database.open().await?;

    let customer_count = repository::count_customers(&mut conn).await?;
    let ticket_count = repository::count_tickets(&mut conn).await?;
    let rows = repository::fetch_defect_rows(&mut conn, policy.valid_priorities())
        .await?;

    conn.close().await?;

    let issues: Vec<String> = rows
        .iter()
        .flat_map(|row| describe_defects(row, policy))
        .take(DIAGNOSTICS_ISSUE_LIMIT)
        .collect();

    debug!(
        "Diagnostics scan: {} of {} tickets carry defects",
        rows.len(),
        ticket_count
    );

    Ok(DiagnosticsSnapshot {
        customer_count,
        ticket_count,
        dirty_count: rows.len(),
        issues,
    })
}

fn describe_defects(row: &DefectRow, policy: &SlaPolicy) -> Vec<String> {
    let mut issues = Vec::new();

    if row.created_at.is_none() {
        issues.push(format!(
            "Ticket {}: Missing/Invalid created_at",
            row.ticket_id
        ));
    }

    let priority = row.priority.as_deref().unwrap_or_default();
    if !policy.is_valid_priority(priority) {
        issues.push(format!(
            "Ticket {}: Invalid priority '{}'",
            row.ticket_id, priority
        ));
    }

    if row.first_response_time_hours.is_none() {
        issues.push(format!("Ticket {}: Missing response time", row.ticket_id));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Ticket;

    fn stored(id: &str) -> Ticket {
        Ticket {
            ticket_id: id.to_string(),
            customer_id: "C_1".to_string(),
            created_at: Some("2025-01-05T12:00:00".to_string()),
            category: "Login".to_string(),
            channel: "chat".to_string(),
            priority: "low".to_string(),
            first_response_time_hours: Some(3.0),
            resolution_time_hours: Some(8.0),
            is_open: false,
            breached_sla: false,
            summary: "Suspicious login".to_string(),
        }
    }

    #[tokio::test]
    async fn test_scan_reports_each_defect_class() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::from_path(&dir.path().join("diag.db"));
        db.initialize_schema().await.unwrap();

        let mut missing_date = stored("T_1");
        missing_date.created_at = None;
        let mut bad_priority = stored("T_2");
        bad_priority.priority = "critical".to_string();
        let mut no_response = stored("T_3");
        no_response.first_response_time_hours = None;

        let mut conn = db.open().await.unwrap();
        for t in [stored("T_0"), missing_date, bad_priority, no_response] {
            repository::upsert_ticket(&mut conn, &t).await.unwrap();
        }
        conn.close().await.unwrap();

        let snapshot = scan_diagnostics(&db, &SlaPolicy::default()).await.unwrap();
        assert_eq!(snapshot.ticket_count, 4);
        assert_eq!(snapshot.customer_count, 0);
        assert_eq!(snapshot.dirty_count, 3);
        assert_eq!(
            snapshot.issues,
            vec![
                "Ticket T_1: Missing/Invalid created_at".to_string(),
                "Ticket T_2: Invalid priority 'critical'".to_string(),
                "Ticket T_3: Missing response time".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_truncates_issue_list() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::from_path(&dir.path().join("diag.db"));
        db.initialize_schema().await.unwrap();

        let mut conn = db.open().await.unwrap();
        for i in 0..60 {
            let mut t = stored(&format!("T_{i}"));
            t.first_response_time_hours = None;
            repository::upsert_ticket(&mut conn, &t).await.unwrap();
        }
        conn.close().await.unwrap();

        let snapshot = scan_diagnostics(&db, &SlaPolicy::default()).await.unwrap();
        assert_eq!(snapshot.dirty_count, 60);
        assert_eq!(snapshot.issues.len(), DIAGNOSTICS_ISSUE_LIMIT);
    }
}
