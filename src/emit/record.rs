use crate::pipeline::{ConditionCounts, Label};
use crate::schema::{Condition, TimeSpan};
use serde::Serialize;

/// Derived classification for one destination, as persisted to the sink.
///
/// `path` is always `["*", destination]`: the labels apply to every path
/// ending at the destination.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub conditions: Vec<Label>,
    pub path: [String; 2],
    pub value: ResultValue,
    pub sources: Sources,
    pub time: TimeSpan,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    /// Path variant: distinct source vantage points.
    Sources { sips: Vec<String> },
    /// Super variant: distinct locations, category counts and the raw conditions.
    Locations {
        locations: Vec<String>,
        counts: ConditionCounts,
        conditions: Vec<Condition>,
    },
}

/// Provenance of a result.
#[derive(Debug, Clone, Serialize)]
pub struct Sources {
    pub obs: Vec<String>,
}

impl ClassificationResult {
    pub fn new(
        labels: Vec<Label>,
        destination: String,
        value: ResultValue,
        observations: Vec<String>,
        time: TimeSpan,
    ) -> Self {
        Self {
            conditions: labels,
            path: ["*".to_string(), destination],
            value,
            sources: Sources { obs: observations },
            time,
        }
    }

    pub fn destination(&self) -> &str {
        &self.path[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Dependency, Strength};
    use crate::schema::Category;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn span() -> TimeSpan {
        let t = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
        TimeSpan::new(t("2017-03-01T00:00:00Z"), t("2017-03-01T06:00:00Z"))
    }

    #[test]
    fn path_result_shape() {
        let result = ClassificationResult::new(
            vec![Label::new(Dependency::Site, None)],
            "198.51.100.7".to_string(),
            ResultValue::Sources {
                sips: vec!["192.0.2.1".to_string()],
            },
            vec!["a".to_string(), "a".to_string()],
            span(),
        );
        assert_eq!(result.destination(), "198.51.100.7");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "conditions": ["ecn.site_dependent"],
                "path": ["*", "198.51.100.7"],
                "value": {"sips": ["192.0.2.1"]},
                "sources": {"obs": ["a", "a"]},
                "time": {"from": "2017-03-01T00:00:00Z", "to": "2017-03-01T06:00:00Z"}
            })
        );
    }

    #[test]
    fn super_result_carries_counts_and_conditions() {
        let conditions = vec![
            Condition::aggregate(Category::Broken),
            Condition::aggregate(Category::Works),
        ];
        let result = ClassificationResult::new(
            vec![Label::graded(Dependency::Path, Strength::Weak)],
            "d".to_string(),
            ResultValue::Locations {
                locations: vec!["ams".to_string()],
                counts: ConditionCounts::tally(&conditions),
                conditions,
            },
            vec!["a".to_string()],
            span(),
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["value"],
            json!({
                "locations": ["ams"],
                "counts": {"works": 1, "broken": 1, "transient": 0, "offline": 0, "weird": 0},
                "conditions": ["ecn.connectivity.super.broken", "ecn.connectivity.super.works"]
            })
        );
        assert_eq!(value["conditions"], json!(["ecn.path_dependent.weak"]));
    }
}
