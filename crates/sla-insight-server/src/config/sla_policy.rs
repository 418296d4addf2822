//! SLA policy: priority → maximum first-response hours.
//!
//! Loaded once at startup and shared read-only for the process lifetime.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::Priority;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub sla_hours_by_priority: BTreeMap<String, u32>,
}

impl Default for SlaPolicy {
    fn default() -> Self {
        let sla_hours_by_priority = Priority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), p.default_sla_hours()))
            .collect();

        Self { sla_hours_by_priority }
    }
}

impl SlaPolicy {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SLA policy {}", path.display()))?;
        let policy: SlaPolicy = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid SLA policy {}", path.display()))?;

        if policy.sla_hours_by_priority.is_empty() {
            anyhow::bail!("SLA policy {} defines no priorities", path.display());
        }

        info!(
            "Loaded SLA policy with {} priorities from {}",
            policy.sla_hours_by_priority.len(),
            path.display()
        );
        Ok(policy)
    }

    /// Missing file → built-in policy. A present but malformed file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "SLA policy {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn is_valid_priority(&self, priority: &str) -> bool {
        self.sla_hours_by_priority.contains_key(priority)
    }

    pub fn valid_priorities(&self) -> impl Iterator<Item = &str> {
        self.sla_hours_by_priority.keys().map(String::as_str)
    }

    pub fn hours_for(&self, priority: &str) -> Option<u32> {
        self.sla_hours_by_priority.get(priority).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_canonical_priorities() {
        let policy = SlaPolicy::default();
        assert_eq!(policy.hours_for("low"), Some(36));
        assert_eq!(policy.hours_for("medium"), Some(24));
        assert_eq!(policy.hours_for("high"), Some(12));
        assert_eq!(policy.hours_for("urgent"), Some(4));
        assert!(!policy.is_valid_priority("med"));
    }

    #[test]
    fn test_load_roundtrips_generator_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sla_policy.json");
        std::fs::write(
            &path,
            r#"{"sla_hours_by_priority": {"low": 48, "urgent": 2}}"#,
        )
        .unwrap();

        let policy = SlaPolicy::load(&path).unwrap();
        let priorities: Vec<&str> = policy.valid_priorities().collect();
        assert_eq!(priorities, vec!["low", "urgent"]);
        assert_eq!(policy.hours_for("urgent"), Some(2));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let policy = SlaPolicy::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(policy, SlaPolicy::default());
    }
}
