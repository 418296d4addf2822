//! Seeded synthetic support data with a learnable SLA-breach signal.
//!
//! Response times scale with category difficulty and with priority, plan,
//! channel and region factors under log-normal noise. A small share of rows
//! is deliberately corrupted so ingestion has defects to report.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use super::GeneratorError;
use crate::config::{GeneratorConfig, SlaPolicy};
use crate::database::Customer;
use crate::domain::{Category, Channel, Plan, Priority, Region};

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REGION_WEIGHTS: [u32; 4] = [40, 25, 25, 10];
const PLAN_WEIGHTS: [u32; 4] = [35, 35, 20, 10];
const BASE_RESPONSE_HOURS: f64 = 12.0;
const OPEN_RATE: f64 = 0.06;
const DIRTY_PRIORITY_RATE: f64 = 0.01;
const DIRTY_RESPONSE_RATE: f64 = 0.01;
const DIRTY_TIMESTAMP_RATE: f64 = 0.005;

const SUMMARIES: [&str; 7] = [
    "Invoice mismatch",
    "Refund request",
    "App crash",
    "Request export option",
    "Slow dashboard",
    "Webhook failing",
    "Suspicious login",
];

/// One CSV row. Empty cells mark injected defects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTicket {
    pub ticket_id: String,
    pub customer_id: String,
    pub created_at: String,
    pub category: String,
    pub channel: String,
    pub priority: String,
    pub first_response_time_hours: Option<f64>,
    pub resolution_time_hours: Option<f64>,
    pub is_open: u8,
    pub breached_sla: u8,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub customers: Vec<Customer>,
    pub tickets: Vec<GeneratedTicket>,
    pub policy: SlaPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub customers: usize,
    pub tickets: usize,
}

fn difficulty(category: Category) -> f64 {
    match category {
        Category::Billing => 0.4,
        Category::Login => 0.5,
        Category::Bug => 0.7,
        Category::Feature => 0.8,
        Category::Performance => 0.75,
        Category::Integration => 0.8,
        Category::Security => 0.9,
    }
}

fn priority_factor(priority: Priority) -> f64 {
    match priority {
        Priority::Low => 1.4,
        Priority::Medium => 1.1,
        Priority::High => 0.9,
        Priority::Urgent => 0.6,
    }
}

fn plan_factor(plan: Plan) -> f64 {
    match plan {
        Plan::Free => 1.3,
        Plan::Pro => 1.1,
        Plan::Business => 0.9,
        Plan::Enterprise => 0.75,
    }
}

fn channel_factor(channel: Channel) -> f64 {
    match channel {
        Channel::Email => 1.1,
        Channel::Chat => 0.8,
        Channel::Phone => 0.7,
        Channel::Web => 1.0,
    }
}

fn region_factor(region: Region) -> f64 {
    match region {
        Region::Na => 0.95,
        Region::Eu => 1.0,
        Region::Apac => 1.05,
        Region::Latam => 1.1,
    }
}

struct Sampler {
    rng: StdRng,
}

impl Sampler {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.random_range(0..items.len())]
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.random::<f64>() < probability
    }

    fn id(&mut self, prefix: &str) -> String {
        let suffix: String = (0..8)
            .map(|_| char::from(*self.pick(ID_ALPHABET)))
            .collect();
        format!("{prefix}{suffix}")
    }

    /// Box-Muller standard normal.
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std_dev * z
    }

    fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        self.gauss(mu, sigma).exp()
    }
}

pub fn generate(config: &GeneratorConfig) -> Result<SyntheticDataset, GeneratorError> {
    if config.customers == 0 || config.days == 0 {
        return Err(GeneratorError::InvalidConfig(
            "generator needs at least one customer and one day".to_string(),
        ));
    }

    let start: NaiveDateTime = NaiveDate::parse_from_str(&config.start_date, "%Y-%m-%d")
        .map_err(|e| {
            GeneratorError::InvalidConfig(format!("start_date '{}': {e}", config.start_date))
        })?
        .and_time(chrono::NaiveTime::MIN);

    let policy = SlaPolicy::default();
    let mut sampler = Sampler::new(config.seed);

    let regions = WeightedIndex::new(REGION_WEIGHTS)
        .map_err(|e| GeneratorError::InvalidConfig(e.to_string()))?;
    let plans = WeightedIndex::new(PLAN_WEIGHTS)
        .map_err(|e| GeneratorError::InvalidConfig(e.to_string()))?;

    let mut customers = Vec::with_capacity(config.customers);
    let mut customer_attrs = Vec::with_capacity(config.customers);
    for _ in 0..config.customers {
        let region = Region::ALL[regions.sample(&mut sampler.rng)];
        let plan = Plan::ALL[plans.sample(&mut sampler.rng)];
        let tenure = sampler.gauss(18.0, 10.0).clamp(0.0, 60.0) as i64;
        let employees = sampler.lognormal(3.2, 0.7).clamp(1.0, 5000.0) as i64;

        customers.push(Customer {
            customer_id: sampler.id("C_"),
            region: region.as_str().to_string(),
            plan: plan.as_str().to_string(),
            tenure_months: tenure,
            employees,
        });
        customer_attrs.push((region, plan));
    }

    let urgent_hours = f64::from(Priority::Urgent.default_sla_hours());
    let mut tickets = Vec::with_capacity(config.tickets);

    for _ in 0..config.tickets {
        let owner = sampler.rng.random_range(0..customers.len());
        let (region, plan) = customer_attrs[owner];

        let created_at = start
            + Duration::days(sampler.rng.random_range(0..i64::from(config.days)))
            + Duration::hours(sampler.rng.random_range(0..24))
            + Duration::minutes(sampler.rng.random_range(0..60));

        let category = *sampler.pick(&Category::ALL);
        let channel = *sampler.pick(&Channel::ALL);
        let mut priority = *sampler.pick(&Priority::ALL);

        let base = difficulty(category);
        let noise = sampler.lognormal(0.0, 0.5);
        let first_response = (BASE_RESPONSE_HOURS
            * base
            * priority_factor(priority)
            * plan_factor(plan)
            * channel_factor(channel)
            * region_factor(region)
            * noise)
            .clamp(0.1, 120.0);

        let mut breached = first_response > f64::from(priority.default_sla_hours());
        // Breaches are escalated, then judged against the urgent SLA.
        if breached {
            priority = Priority::Urgent;
            breached = first_response > urgent_hours;
        }

        let is_open = sampler.chance(OPEN_RATE);
        let resolution = if is_open {
            None
        } else {
            let res_noise = sampler.lognormal(0.0, 0.6);
            Some(
                ((first_response * 0.7 + BASE_RESPONSE_HOURS * base) * res_noise)
                    .clamp(0.2, 500.0),
            )
        };

        let summary = sampler.pick(&SUMMARIES).to_string();

        let mut priority_text = priority.as_str().to_string();
        if sampler.chance(DIRTY_PRIORITY_RATE) {
            priority_text = "med".to_string();
        }
        let mut first_response_cell = Some(first_response);
        if sampler.chance(DIRTY_RESPONSE_RATE) {
            first_response_cell = None;
        }
        let mut created_at_text = created_at.format("%Y-%m-%dT%H:%M:%S").to_string();
        if sampler.chance(DIRTY_TIMESTAMP_RATE) {
            created_at_text.clear();
        }

        tickets.push(GeneratedTicket {
            ticket_id: sampler.id("T_"),
            customer_id: customers[owner].customer_id.clone(),
            created_at: created_at_text,
            category: category.as_str().to_string(),
            channel: channel.as_str().to_string(),
            priority: priority_text,
            first_response_time_hours: first_response_cell,
            resolution_time_hours: resolution,
            is_open: u8::from(is_open),
            breached_sla: u8::from(breached),
            summary,
        });
    }

    Ok(SyntheticDataset {
        customers,
        tickets,
        policy,
    })
}

/// Write `customers.csv`, `tickets.csv` and `sla_policy.json` into `dir`.
pub fn write_dataset(dataset: &SyntheticDataset, dir: &Path) -> Result<(), GeneratorError> {
    std::fs::create_dir_all(dir)?;

    let mut writer = csv::Writer::from_path(dir.join("customers.csv"))?;
    for customer in &dataset.customers {
        writer.serialize(customer)?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(dir.join("tickets.csv"))?;
    for ticket in &dataset.tickets {
        writer.serialize(ticket)?;
    }
    writer.flush()?;

    let policy_json = serde_json::to_string_pretty(&dataset.policy)?;
    std::fs::write(dir.join("sla_policy.json"), policy_json)?;

    Ok(())
}

/// Generate and write in one step, as the `generate` subcommand does.
pub fn generate_to_dir(config: &GeneratorConfig) -> Result<GenerationSummary, GeneratorError> {
    let dataset = generate(config)?;
    write_dataset(&dataset, &config.output_dir)?;

    info!(
        "Wrote {} customers and {} tickets to {}",
        dataset.customers.len(),
        dataset.tickets.len(),
        config.output_dir.display()
    );

    Ok(GenerationSummary {
        customers: dataset.customers.len(),
        tickets: dataset.tickets.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(customers: usize, tickets: usize) -> GeneratorConfig {
        GeneratorConfig {
            customers,
            tickets,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = generate(&config(20, 200)).unwrap();
        let b = generate(&config(20, 200)).unwrap();
        assert_eq!(a.customers, b.customers);
        assert_eq!(a.tickets, b.tickets);
    }

    #[test]
    fn test_values_stay_in_bounds() {
        let data = generate(&config(50, 2000)).unwrap();

        for c in &data.customers {
            assert!(c.customer_id.starts_with("C_") && c.customer_id.len() == 10);
            assert!((0..=60).contains(&c.tenure_months));
            assert!((1..=5000).contains(&c.employees));
            assert!(Region::parse(&c.region).is_some());
            assert!(Plan::parse(&c.plan).is_some());
        }

        for t in &data.tickets {
            if let Some(frt) = t.first_response_time_hours {
                assert!((0.1..=120.0).contains(&frt));
            }
            match t.resolution_time_hours {
                Some(res) => {
                    assert_eq!(t.is_open, 0);
                    assert!((0.2..=500.0).contains(&res));
                }
                None => assert_eq!(t.is_open, 1),
            }
            if !t.created_at.is_empty() {
                assert!(t.created_at.as_str() >= "2025-01-01T00:00:00");
                assert!(t.created_at.as_str() < "2025-06-30T00:00:00");
            }
        }
    }

    #[test]
    fn test_breaches_are_escalated_to_urgent() {
        let data = generate(&config(30, 1500)).unwrap();
        for t in data.tickets.iter().filter(|t| t.breached_sla == 1) {
            assert!(t.priority == "urgent" || t.priority == "med");
        }
        assert!(data.tickets.iter().any(|t| t.breached_sla == 1));
    }

    #[test]
    fn test_dirty_rows_are_injected() {
        let data = generate(&config(50, 5000)).unwrap();
        assert!(data.tickets.iter().any(|t| t.priority == "med"));
        assert!(data
            .tickets
            .iter()
            .any(|t| t.first_response_time_hours.is_none()));
    }

    #[test]
    fn test_write_dataset_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = generate(&config(5, 25)).unwrap();
        write_dataset(&data, dir.path()).unwrap();

        let tickets = std::fs::read_to_string(dir.path().join("tickets.csv")).unwrap();
        let header = tickets.lines().next().unwrap();
        assert_eq!(
            header,
            "ticket_id,customer_id,created_at,category,channel,priority,\
             first_response_time_hours,resolution_time_hours,is_open,breached_sla,summary"
        );
        assert_eq!(tickets.lines().count(), 26);

        let policy = SlaPolicy::load(&dir.path().join("sla_policy.json")).unwrap();
        assert_eq!(policy, SlaPolicy::default());
    }

    #[test]
    fn test_bad_start_date_rejected() {
        let mut cfg = config(5, 5);
        cfg.start_date = "January".to_string();
        assert!(matches!(
            generate(&cfg),
            Err(GeneratorError::InvalidConfig(_))
        ));
    }
}
