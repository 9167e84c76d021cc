//! Evidence-sufficiency gates. A failed gate drops evidence silently.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::pipeline::group::EvidenceGroup;
use crate::schema::{Observation, Variant};

/// Record-level support check applied before grouping.
///
/// Super-aggregate records backed by too few underlying measurements never
/// reach a group. Raw observations always pass.
#[derive(Debug, Clone, Copy)]
pub struct RecordGate {
    min_support: Option<u64>,
}

impl RecordGate {
    pub fn for_variant(config: &PipelineConfig) -> Self {
        let min_support = match config.variant {
            Variant::Path => None,
            Variant::Super => Some(config.min_record_support),
        };
        Self { min_support }
    }

    pub fn supports(&self, obs: &Observation) -> Result<bool, PipelineError> {
        let Some(min) = self.min_support else {
            return Ok(true);
        };
        let count = obs.source_count.ok_or_else(|| {
            PipelineError::malformed(&obs.id, "missing or non-integer source_count")
        })?;
        Ok(count >= min)
    }
}

/// Hard cutoff on how diverse and how numerous a group's evidence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiversityGate {
    pub min_diversity: usize,
    pub min_records: usize,
}

impl DiversityGate {
    pub fn for_variant(config: &PipelineConfig) -> Self {
        match config.variant {
            Variant::Path => Self {
                min_diversity: config.min_sources,
                min_records: 1,
            },
            Variant::Super => Self {
                min_diversity: config.min_locations,
                min_records: config.min_supported_records,
            },
        }
    }

    pub fn passes(&self, group: &EvidenceGroup) -> bool {
        group.diversity.len() >= self.min_diversity && group.records >= self.min_records
    }
}
