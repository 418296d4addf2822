use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::database::TrainingRow;

/// Maps category strings to dense indices over the sorted training vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
    }

    /// Unseen values fall back to the first vocabulary class.
    pub fn transform_or_first(&self, value: &str) -> usize {
        self.transform(value).unwrap_or(0)
    }
}

/// One encoder per categorical feature, persisted alongside the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoders {
    pub category: LabelEncoder,
    pub channel: LabelEncoder,
    pub priority: LabelEncoder,
    pub region: LabelEncoder,
    pub plan: LabelEncoder,
}

impl FeatureEncoders {
    pub fn fit(rows: &[TrainingRow]) -> Self {
        Self {
            category: LabelEncoder::fit(rows.iter().map(|r| r.category.as_str())),
            channel: LabelEncoder::fit(rows.iter().map(|r| r.channel.as_str())),
            priority: LabelEncoder::fit(rows.iter().map(|r| r.priority.as_str())),
            region: LabelEncoder::fit(rows.iter().map(|r| r.region.as_str())),
            plan: LabelEncoder::fit(rows.iter().map(|r| r.plan.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_sorted_and_distinct() {
        let encoder = LabelEncoder::fit(["phone", "chat", "web", "chat", "email"]);
        assert_eq!(encoder.classes(), ["chat", "email", "phone", "web"]);
        assert_eq!(encoder.transform("phone"), Some(2));
        assert_eq!(encoder.transform("fax"), None);
    }

    #[test]
    fn test_unseen_value_maps_to_first_class() {
        let encoder = LabelEncoder::fit(["medium", "high", "low"]);
        assert_eq!(encoder.transform_or_first("unknown"), 0);
        assert_eq!(encoder.classes()[0], "high");
    }
}
