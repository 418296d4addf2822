// ============================================================================
// Ticket enumerations
// File: crates/sla-insight-server/src/domain/ticket.rs
// ============================================================================

use serde::{Deserialize, Serialize};

/// Ticket priority. Stored values outside this set are data-quality defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }

    /// The only lexical correction applied at ingestion.
    pub fn repair(raw: &str) -> Option<Self> {
        match raw {
            "med" => Some(Priority::Medium),
            _ => None,
        }
    }

    pub fn default_sla_hours(&self) -> u32 {
        match self {
            Priority::Low => 36,
            Priority::Medium => 24,
            Priority::High => 12,
            Priority::Urgent => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Billing,
    Login,
    Bug,
    Feature,
    Performance,
    Integration,
    Security,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Billing,
        Category::Login,
        Category::Bug,
        Category::Feature,
        Category::Performance,
        Category::Integration,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Billing => "Billing",
            Category::Login => "Login",
            Category::Bug => "Bug",
            Category::Feature => "Feature",
            Category::Performance => "Performance",
            Category::Integration => "Integration",
            Category::Security => "Security",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Chat,
    Phone,
    Web,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Email, Channel::Chat, Channel::Phone, Channel::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Chat => "chat",
            Channel::Phone => "phone",
            Channel::Web => "web",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}
