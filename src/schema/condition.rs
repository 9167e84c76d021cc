//! Condition tags and the two pipeline vocabularies.
//!
//! Observation conditions look like `ecn.connectivity.broken` (raw
//! measurements) or `ecn.connectivity.super.broken` (aggregates over several
//! raw measurements). We parse them into a `(Level, Category)` pair so the
//! rest of the pipeline never compares strings.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Works,
    Broken,
    Transient,
    Offline,
    Weird,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Works => "works",
            Self::Broken => "broken",
            Self::Transient => "transient",
            Self::Offline => "offline",
            Self::Weird => "weird",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "works" => Some(Self::Works),
            "broken" => Some(Self::Broken),
            "transient" => Some(Self::Transient),
            "offline" => Some(Self::Offline),
            "weird" => Some(Self::Weird),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a condition describes a single measurement or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Raw,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Condition {
    pub level: Level,
    pub category: Category,
}

impl Condition {
    pub const fn raw(category: Category) -> Self {
        Self {
            level: Level::Raw,
            category,
        }
    }

    pub const fn aggregate(category: Category) -> Self {
        Self {
            level: Level::Super,
            category,
        }
    }

    /// Full tag as stored in the observation store.
    pub fn tag(&self) -> String {
        match self.level {
            Level::Raw => format!("ecn.connectivity.{}", self.category),
            Level::Super => format!("ecn.connectivity.super.{}", self.category),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

/// Which evidence granularity a run classifies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Raw observations, grouped by distinct source vantage point.
    #[default]
    Path,
    /// Super-aggregate observations, grouped by distinct location.
    Super,
}

impl Variant {
    /// True if `condition` is admissible evidence for this variant.
    pub fn admits(self, condition: &Condition) -> bool {
        match self {
            Self::Path => condition.level == Level::Raw && condition.category != Category::Weird,
            Self::Super => condition.level == Level::Super,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => f.write_str("path"),
            Self::Super => f.write_str("super"),
        }
    }
}

static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ecn\.connectivity\.(super\.)?(works|broken|transient|offline|weird)$")
        .expect("condition tag pattern compiles")
});

impl Condition {
    /// Parse a tag; anything outside the ECN connectivity vocabulary is `None`.
    pub fn parse(tag: &str) -> Option<Condition> {
        let caps = CONDITION_RE.captures(tag)?;
        let level = if caps.get(1).is_some() {
            Level::Super
        } else {
            Level::Raw
        };
        let category = Category::from_name(caps.get(2)?.as_str())?;
        Some(Condition { level, category })
    }
}
