use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::Connection;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::stats;
use super::OverviewFilters;
use crate::database::{repository, Database, OverviewRow};

pub const TOP_CATEGORIES: usize = 5;
pub const TOP_PROBLEM_CUSTOMERS: usize = 5;
/// Customers with fewer filtered tickets are never ranked.
pub const MIN_CUSTOMER_TICKETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemCustomer {
    pub customer_id: String,
    pub breach_rate: f64,
    pub total_tickets: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewReport {
    pub daily_volume: BTreeMap<String, usize>,
    /// `[category, count]` pairs, most frequent first.
    pub top_categories: Vec<(String, usize)>,
    pub sla_breach_rate: f64,
    pub median_resolution_time: f64,
    pub p95_resolution_time: f64,
    pub problem_customers: Vec<ProblemCustomer>,
}

#[derive(Default)]
struct CustomerTally {
    breached: usize,
    total: usize,
}

/// Aggregate filtered rows. `None` when there is nothing to aggregate.
pub fn summarize(rows: &[OverviewRow]) -> Option<OverviewReport> {
    if rows.is_empty() {
        return None;
    }

    let mut daily_volume: BTreeMap<String, usize> = BTreeMap::new();
    let mut categories: IndexMap<&str, usize> = IndexMap::new();
    let mut customers: IndexMap<&str, CustomerTally> = IndexMap::new();
    let mut resolution_times = Vec::new();
    let mut breach_count = 0usize;

    for row in rows {
        if let Some(created_at) = &row.created_at {
            let day: String = created_at.chars().take(10).collect();
            *daily_volume.entry(day).or_default() += 1;
        }

        *categories.entry(row.category.as_str()).or_default() += 1;

        if row.breached_sla {
            breach_count += 1;
        }

        if let Some(hours) = row.resolution_time_hours {
            resolution_times.push(hours);
        }

        if row.has_customer() {
            let tally = customers.entry(row.customer_id.as_str()).or_default();
            tally.total += 1;
            if row.breached_sla {
                tally.breached += 1;
            }
        }
    }

    let mut top_categories: Vec<(String, usize)> = categories
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    // Stable: ties keep first-encounter order.
    top_categories.sort_by(|a, b| b.1.cmp(&a.1));
    top_categories.truncate(TOP_CATEGORIES);

    let mut problem_customers: Vec<ProblemCustomer> = customers
        .into_iter()
        .filter(|(_, tally)| tally.total >= MIN_CUSTOMER_TICKETS)
        .map(|(customer_id, tally)| ProblemCustomer {
            customer_id: customer_id.to_string(),
            breach_rate: percentage(tally.breached, tally.total),
            total_tickets: tally.total,
        })
        .collect();
    problem_customers.sort_by(|a, b| b.breach_rate.total_cmp(&a.breach_rate));
    problem_customers.truncate(TOP_PROBLEM_CUSTOMERS);

    Some(OverviewReport {
        daily_volume,
        top_categories,
        sla_breach_rate: percentage(breach_count, rows.len()),
        median_resolution_time: stats::median(&resolution_times),
        p95_resolution_time: stats::p95(&resolution_times),
        problem_customers,
    })
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[derive(Clone)]
pub struct AnalyticsService {
    database: Database,
}

impl AnalyticsService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Windowed statistics over the filtered ticket set. `Ok(None)` = no data.
    pub async fn compute_overview(
        &self,
        filters: &OverviewFilters,
    ) -> Result<Option<OverviewReport>, sqlx::Error> {
        let mut conn = self.database.open().await?;
        let rows = repository::fetch_overview_rows(&mut conn, filters).await?;
        conn.close().await?;

        debug!(
            "Overview filters {:?} matched {} tickets",
            filters,
            rows.len()
        );

        let report = summarize(&rows);
        if let Some(report) = &report {
            info!(
                "Overview computed: {} tickets, breach rate {:.2}%",
                rows.len(),
                report.sla_breach_rate
            );
        }
        Ok(report)
    }
}
