//! Admissibility of raw evidence for one run.

use crate::schema::{Condition, Document, Observation, RevisionOrder, TimeSpan, Variant};

#[derive(Debug, Clone, Copy)]
pub struct EvidenceFilter {
    variant: Variant,
    window: TimeSpan,
    revision_order: RevisionOrder,
}

impl EvidenceFilter {
    pub fn new(variant: Variant, window: TimeSpan, revision_order: RevisionOrder) -> Self {
        Self {
            variant,
            window,
            revision_order,
        }
    }

    /// Whether an untyped document carries any tag of the variant's
    /// vocabulary. Documents that do not are never typed.
    pub fn carries_evidence(&self, doc: &Document) -> bool {
        doc.tags()
            .filter_map(Condition::parse)
            .any(|c| self.variant.admits(&c))
    }

    /// Whitelisted conditions of `obs`, or `None` if it is not evidence for
    /// this run (invalid newest revision, outside the window, or no condition
    /// from the variant's vocabulary).
    ///
    /// Non-whitelisted tags of an admitted observation are dropped here, so
    /// downstream counting only ever sees the variant's vocabulary.
    pub fn admit(&self, obs: &Observation) -> Option<Vec<Condition>> {
        if !obs.is_valid(self.revision_order) || !self.window.contains(&obs.time) {
            return None;
        }

        let conditions: Vec<Condition> = obs
            .conditions
            .iter()
            .map(String::as_str)
            .filter_map(Condition::parse)
            .filter(|c| self.variant.admits(c))
            .collect();

        if conditions.is_empty() {
            None
        } else {
            Some(conditions)
        }
    }
}
