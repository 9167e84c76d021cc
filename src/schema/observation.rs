//! Observation records as they come out of the evidence store.
//!
//! JSON shape (one object per line):
//! {
//!   "_id": "obs-1",
//!   "conditions": ["ecn.connectivity.broken"],
//!   "path": ["192.0.2.1", "*", "198.51.100.7"],   // vantage point first, destination last
//!   "time": {"from": "2017-03-01T00:00:00Z", "to": "2017-03-01T01:00:00Z"},
//!   "action_ids": [{"id": 17, "valid": true}],     // revision history, only `valid` is read
//!   "location": "ams",                             // super-aggregates only
//!   "source_count": 3                              // super-aggregates only
//! }
//!
//! The store also holds documents that are not connectivity evidence
//! (negotiation results, tracebox runs, ...) with their own field types. Those
//! stay untyped [`Document`]s and are never converted.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub conditions: Vec<String>,

    pub path: Vec<String>,

    pub time: TimeSpan,

    #[serde(default)]
    pub action_ids: Vec<Revision>,

    /// `None` when absent or not a string.
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,

    /// `None` when absent or not a non-negative integer.
    #[serde(default, deserialize_with = "lenient")]
    pub source_count: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// One entry of an observation's revision history.
#[derive(Debug, Clone, Deserialize)]
pub struct Revision {
    pub valid: bool,
}

/// One line of the observation export, parsed as JSON but not yet typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub line: usize,
    pub value: Value,
}

impl Document {
    /// String entries of `conditions`; anything else there is ignored.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.value
            .get("conditions")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// `_id` if the document has a string one, its line otherwise.
    pub fn label(&self) -> String {
        match self.value.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => format!("line {}", self.line),
        }
    }

    /// Type the document. Only called for documents carrying evidence, so a
    /// mismatch here is a defect of the store.
    pub fn into_observation(self) -> Result<Observation, PipelineError> {
        let label = self.label();
        serde_json::from_value(self.value)
            .map_err(|error| PipelineError::malformed(&label, error.to_string()))
    }
}

/// Closed time interval. Also used as the processing window of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeSpan {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, other: &TimeSpan) -> bool {
        other.from >= self.from && other.to <= self.to
    }

    /// Smallest span covering both.
    pub fn union(&self, other: &TimeSpan) -> TimeSpan {
        TimeSpan {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }
}

/// Where the store keeps the newest revision in `action_ids`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionOrder {
    #[default]
    NewestFirst,
    NewestLast,
}

impl Observation {
    /// Last path element.
    pub fn destination(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// First path element.
    pub fn source(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    /// Validity of the newest revision. No revisions means not valid.
    pub fn is_valid(&self, order: RevisionOrder) -> bool {
        let newest = match order {
            RevisionOrder::NewestFirst => self.action_ids.first(),
            RevisionOrder::NewestLast => self.action_ids.last(),
        };
        newest.is_some_and(|r| r.valid)
    }
}
