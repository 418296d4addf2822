use serde::{Deserialize, Serialize};

/// Optional, independently composable AND conditions for the overview.
///
/// `start` / `end` compare lexically against the stored ISO timestamp, both
/// inclusive. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewFilters {
    pub start: Option<String>,
    pub end: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

impl OverviewFilters {
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            start: keep(self.start),
            end: keep(self.end),
            category: keep(self.category),
            priority: keep(self.priority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_dropped() {
        let filters = OverviewFilters {
            start: Some(String::new()),
            end: Some("2025-03-01".to_string()),
            category: Some("  ".to_string()),
            priority: None,
        }
        .normalized();

        assert_eq!(filters.start, None);
        assert_eq!(filters.end.as_deref(), Some("2025-03-01"));
        assert_eq!(filters.category, None);
    }
}
