//! Classification pipeline: filter -> record gate -> group -> diversity gate -> classify.
//!
//! The fold over observations is sequential and lazy; once every observation
//! has been seen, groups are gated and classified independently on the rayon
//! pool. Results come out ordered by destination.

pub mod filter;
pub mod gate;
pub mod group;
pub mod policy;

pub use filter::EvidenceFilter;
pub use gate::{DiversityGate, RecordGate};
pub use group::{EvidenceGroup, Grouper};
pub use policy::{ConditionCounts, Dependency, Label, Strength};

use crate::config::PipelineConfig;
use crate::emit::{ClassificationResult, ResultValue};
use crate::error::PipelineError;
use crate::schema::{Document, Observation, TimeSpan, Variant};
use rayon::prelude::*;
use serde::Serialize;

/// Counters describing what happened to the evidence of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Observations read.
    pub observations: usize,
    /// Observations that passed the evidence filter.
    pub admitted: usize,
    /// Admitted aggregate records dropped for too little support.
    pub unsupported: usize,
    pub groups: usize,
    pub below_diversity: usize,
    /// Groups that passed the diversity gate but got no label.
    pub rejected: usize,
    pub emitted: usize,
}

/// Results of a run plus its counters.
#[derive(Debug)]
pub struct Outcome {
    pub results: Vec<ClassificationResult>,
    pub stats: RunStats,
}

enum Verdict {
    BelowDiversity,
    Rejected,
    Classified(ClassificationResult),
}

/// Incremental classifier for one run over one time window.
#[derive(Debug)]
pub struct Classifier {
    variant: Variant,
    filter: EvidenceFilter,
    record_gate: RecordGate,
    diversity_gate: DiversityGate,
    grouper: Grouper,
    stats: RunStats,
}

impl Classifier {
    pub fn new(config: &PipelineConfig, window: TimeSpan) -> Self {
        Self {
            variant: config.variant,
            filter: EvidenceFilter::new(config.variant, window, config.revision_order),
            record_gate: RecordGate::for_variant(config),
            diversity_gate: DiversityGate::for_variant(config),
            grouper: Grouper::new(config.variant),
            stats: RunStats::default(),
        }
    }

    /// Feed one document straight from the store. Documents without any tag
    /// of the variant's vocabulary are counted and skipped untyped.
    pub fn observe_document(&mut self, doc: Document) -> Result<(), PipelineError> {
        if !self.filter.carries_evidence(&doc) {
            self.stats.observations += 1;
            return Ok(());
        }
        self.observe(doc.into_observation()?)
    }

    /// Feed one observation. Inadmissible evidence is skipped; only
    /// structural defects are errors.
    pub fn observe(&mut self, obs: Observation) -> Result<(), PipelineError> {
        self.stats.observations += 1;

        let Some(conditions) = self.filter.admit(&obs) else {
            return Ok(());
        };
        self.stats.admitted += 1;

        if !self.record_gate.supports(&obs)? {
            self.stats.unsupported += 1;
            return Ok(());
        }

        self.grouper.add(&obs, conditions)
    }

    /// Gate and classify every group.
    pub fn finish(self) -> Outcome {
        let Self {
            variant,
            diversity_gate,
            grouper,
            mut stats,
            ..
        } = self;

        stats.groups = grouper.len();
        let verdicts: Vec<Verdict> = grouper
            .into_groups()
            .into_par_iter()
            .map(|group| judge(variant, &diversity_gate, group))
            .collect();

        let mut results = Vec::new();
        for verdict in verdicts {
            match verdict {
                Verdict::BelowDiversity => stats.below_diversity += 1,
                Verdict::Rejected => stats.rejected += 1,
                Verdict::Classified(result) => results.push(result),
            }
        }
        stats.emitted = results.len();

        tracing::info!(
            variant = %variant,
            observations = stats.observations,
            admitted = stats.admitted,
            unsupported = stats.unsupported,
            groups = stats.groups,
            below_diversity = stats.below_diversity,
            rejected = stats.rejected,
            emitted = stats.emitted,
            "classification finished"
        );

        Outcome { results, stats }
    }
}

fn judge(variant: Variant, gate: &DiversityGate, group: EvidenceGroup) -> Verdict {
    if !gate.passes(&group) {
        return Verdict::BelowDiversity;
    }

    let counts = ConditionCounts::tally(&group.conditions);
    let labels = policy::labels_for(variant, &counts);
    if labels.is_empty() {
        return Verdict::Rejected;
    }

    let EvidenceGroup {
        destination,
        conditions,
        diversity,
        observations,
        time,
        ..
    } = group;

    let value = match variant {
        Variant::Path => ResultValue::Sources {
            sips: diversity.into_iter().collect(),
        },
        Variant::Super => ResultValue::Locations {
            locations: diversity.into_iter().collect(),
            counts,
            conditions,
        },
    };

    Verdict::Classified(ClassificationResult::new(
        labels,
        destination,
        value,
        observations,
        time,
    ))
}

/// Gate and classify a single finished group.
pub fn classify_group(
    variant: Variant,
    gate: &DiversityGate,
    group: EvidenceGroup,
) -> Option<ClassificationResult> {
    match judge(variant, gate, group) {
        Verdict::Classified(result) => Some(result),
        Verdict::BelowDiversity | Verdict::Rejected => None,
    }
}

/// Classify a whole evidence stream in one call.
pub fn classify<I>(
    evidence: I,
    config: &PipelineConfig,
    window: TimeSpan,
) -> Result<Outcome, PipelineError>
where
    I: IntoIterator<Item = Observation>,
{
    let mut classifier = Classifier::new(config, window);
    for obs in evidence {
        classifier.observe(obs)?;
    }
    Ok(classifier.finish())
}
