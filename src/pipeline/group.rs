//! Group admitted evidence by destination.

use crate::error::PipelineError;
use crate::schema::{Condition, Observation, TimeSpan, Variant};
use std::collections::{BTreeMap, BTreeSet};

/// All evidence for one destination within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceGroup {
    pub destination: String,

    /// Every admitted condition, duplicates kept.
    pub conditions: Vec<Condition>,

    /// Distinct source vantage points (path variant) or locations (super variant).
    pub diversity: BTreeSet<String>,

    /// Contributing observation ids. The path variant repeats an id once per
    /// condition it contributed.
    pub observations: Vec<String>,

    /// Contributing observation records.
    pub records: usize,

    pub time: TimeSpan,
}

impl EvidenceGroup {
    fn new(destination: &str, time: TimeSpan) -> Self {
        Self {
            destination: destination.to_string(),
            conditions: Vec::new(),
            diversity: BTreeSet::new(),
            observations: Vec::new(),
            records: 0,
            time,
        }
    }

    /// Fold another partial group for the same destination into this one.
    #[cfg(test)]
    fn merge(&mut self, other: EvidenceGroup) {
        debug_assert_eq!(self.destination, other.destination);
        self.conditions.extend(other.conditions);
        self.diversity.extend(other.diversity);
        self.observations.extend(other.observations);
        self.records += other.records;
        self.time = self.time.union(&other.time);
    }
}

/// Streaming group-by over admitted observations.
#[derive(Debug)]
pub struct Grouper {
    variant: Variant,
    groups: BTreeMap<String, EvidenceGroup>,
}

impl Grouper {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            groups: BTreeMap::new(),
        }
    }

    /// Add one admitted observation with its whitelisted conditions.
    pub fn add(
        &mut self,
        obs: &Observation,
        conditions: Vec<Condition>,
    ) -> Result<(), PipelineError> {
        let destination = obs
            .destination()
            .ok_or_else(|| PipelineError::malformed(&obs.id, "empty path"))?;

        let vantage = match self.variant {
            // path[0] exists whenever path[last] does.
            Variant::Path => obs.source().unwrap_or(destination).to_string(),
            Variant::Super => obs.location.clone().ok_or_else(|| {
                PipelineError::malformed(&obs.id, "missing or non-string location")
            })?,
        };

        let group = self
            .groups
            .entry(destination.to_string())
            .or_insert_with(|| EvidenceGroup::new(destination, obs.time));

        group.diversity.insert(vantage);
        group.records += 1;
        group.time = group.time.union(&obs.time);

        match self.variant {
            Variant::Path => {
                for condition in conditions {
                    group.conditions.push(condition);
                    group.observations.push(obs.id.clone());
                }
            }
            Variant::Super => {
                group.conditions.extend(conditions);
                group.observations.push(obs.id.clone());
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Finished groups, ordered by destination.
    pub fn into_groups(self) -> Vec<EvidenceGroup> {
        self.groups.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Category, Revision};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn t(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn obs(id: &str, path: &[&str], from: &str, to: &str) -> Observation {
        Observation {
            id: id.to_string(),
            conditions: vec![],
            path: path.iter().map(|p| p.to_string()).collect(),
            time: TimeSpan::new(t(from), t(to)),
            action_ids: vec![Revision { valid: true }],
            location: None,
            source_count: None,
        }
    }

    #[test]
    fn path_variant_unwinds_conditions() {
        let mut g = Grouper::new(Variant::Path);
        let a = obs("a", &["s1", "d"], "2017-03-01T01:00:00Z", "2017-03-01T02:00:00Z");
        let b = obs("b", &["s2", "x", "d"], "2017-03-01T00:30:00Z", "2017-03-01T01:30:00Z");
        g.add(
            &a,
            vec![Condition::raw(Category::Broken), Condition::raw(Category::Works)],
        )
        .unwrap();
        g.add(&b, vec![Condition::raw(Category::Broken)]).unwrap();

        let groups = g.into_groups();
        assert_eq!(groups.len(), 1);
        let d = &groups[0];
        assert_eq!(d.destination, "d");
        assert_eq!(d.observations, vec!["a", "a", "b"]);
        assert_eq!(d.conditions.len(), 3);
        assert_eq!(d.diversity.iter().collect::<Vec<_>>(), vec!["s1", "s2"]);
        assert_eq!(d.records, 2);
        assert_eq!(d.time.from, t("2017-03-01T00:30:00Z"));
        assert_eq!(d.time.to, t("2017-03-01T02:00:00Z"));
    }

    #[test]
    fn super_variant_groups_by_location() {
        let mut g = Grouper::new(Variant::Super);
        let mut a = obs("a", &["s1", "d"], "2017-03-01T01:00:00Z", "2017-03-01T02:00:00Z");
        a.location = Some("ams".to_string());
        let mut b = obs("b", &["s2", "d"], "2017-03-01T01:00:00Z", "2017-03-01T02:00:00Z");
        b.location = Some("ams".to_string());
        g.add(
            &a,
            vec![
                Condition::aggregate(Category::Broken),
                Condition::aggregate(Category::Works),
            ],
        )
        .unwrap();
        g.add(&b, vec![Condition::aggregate(Category::Broken)]).unwrap();

        let groups = g.into_groups();
        assert_eq!(groups[0].observations, vec!["a", "b"]);
        assert_eq!(groups[0].conditions.len(), 3);
        assert_eq!(groups[0].diversity.len(), 1);
    }

    #[test]
    fn missing_location_is_malformed() {
        let mut g = Grouper::new(Variant::Super);
        let a = obs("a", &["s1", "d"], "2017-03-01T01:00:00Z", "2017-03-01T02:00:00Z");
        let err = g
            .add(&a, vec![Condition::aggregate(Category::Broken)])
            .unwrap_err();
        assert!(matches!(err, PipelineError::Malformed { .. }));
    }

    #[test]
    fn empty_path_is_malformed() {
        let mut g = Grouper::new(Variant::Path);
        let a = obs("a", &[], "2017-03-01T01:00:00Z", "2017-03-01T02:00:00Z");
        assert!(g.add(&a, vec![Condition::raw(Category::Broken)]).is_err());
        assert!(g.is_empty());
    }

    #[test]
    fn merging_partial_groups_matches_single_pass() {
        let a = obs("a", &["s1", "d"], "2017-03-01T01:00:00Z", "2017-03-01T02:00:00Z");
        let b = obs("b", &["s2", "d"], "2017-03-01T00:00:00Z", "2017-03-01T01:00:00Z");
        let broken = || vec![Condition::raw(Category::Broken)];

        let mut whole = Grouper::new(Variant::Path);
        whole.add(&a, broken()).unwrap();
        whole.add(&b, broken()).unwrap();

        let mut left = Grouper::new(Variant::Path);
        left.add(&b, broken()).unwrap();
        let mut right = Grouper::new(Variant::Path);
        right.add(&a, broken()).unwrap();

        let mut merged = left.into_groups().remove(0);
        merged.merge(right.into_groups().remove(0));
        let single = whole.into_groups().remove(0);

        assert_eq!(merged.diversity, single.diversity);
        assert_eq!(merged.records, single.records);
        assert_eq!(merged.time, single.time);
        let mut ids = merged.observations.clone();
        ids.sort();
        assert_eq!(ids, single.observations);
    }
}
