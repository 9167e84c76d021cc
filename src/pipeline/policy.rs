//! Condition-count arithmetic deriving dependency labels.

use crate::schema::{Category, Condition, Variant};
use serde::Serialize;
use std::fmt;

/// Per-category occurrence counts over a group's condition multiset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConditionCounts {
    pub works: usize,
    pub broken: usize,
    pub transient: usize,
    pub offline: usize,
    pub weird: usize,
}

impl ConditionCounts {
    pub fn tally<'a>(conditions: impl IntoIterator<Item = &'a Condition>) -> Self {
        let mut counts = Self::default();
        for condition in conditions {
            match condition.category {
                Category::Works => counts.works += 1,
                Category::Broken => counts.broken += 1,
                Category::Transient => counts.transient += 1,
                Category::Offline => counts.offline += 1,
                Category::Weird => counts.weird += 1,
            }
        }
        counts
    }

    /// Evidence that makes a strict call untrustworthy.
    pub fn is_contaminated(&self) -> bool {
        self.offline > 0 || self.transient > 0 || self.weird > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dependency {
    Path,
    Site,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strength {
    Weak,
    Strict,
    Strong,
}

/// A dependency tag such as `ecn.path_dependent` or `ecn.site_dependent.strict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
    pub dependency: Dependency,
    pub strength: Option<Strength>,
}

impl Label {
    pub const fn new(dependency: Dependency, strength: Option<Strength>) -> Self {
        Self {
            dependency,
            strength,
        }
    }

    pub const fn graded(dependency: Dependency, strength: Strength) -> Self {
        Self::new(dependency, Some(strength))
    }

    pub fn tag(&self) -> String {
        let base = match self.dependency {
            Dependency::Path => "ecn.path_dependent",
            Dependency::Site => "ecn.site_dependent",
        };
        match self.strength {
            None => base.to_string(),
            Some(Strength::Weak) => format!("{base}.weak"),
            Some(Strength::Strict) => format!("{base}.strict"),
            Some(Strength::Strong) => format!("{base}.strong"),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

/// Binary path/site call over raw observations.
///
/// Only groups with broken evidence and no transient or offline evidence are
/// classified; some working paths make it path dependent, none make it site
/// dependent.
pub fn classify_path(counts: &ConditionCounts) -> Option<Label> {
    if counts.broken == 0 || counts.transient > 0 || counts.offline > 0 {
        return None;
    }
    if counts.works > 0 {
        Some(Label::new(Dependency::Path, None))
    } else {
        Some(Label::new(Dependency::Site, None))
    }
}

/// Graded labels over super-aggregate counts. Empty when there is no broken
/// evidence at all.
///
/// strong requires broken >= 2 only on the path side; site strict and strong
/// are always emitted together.
pub fn classify_super(counts: &ConditionCounts) -> Vec<Label> {
    let mut labels = Vec::new();
    if counts.broken == 0 {
        return labels;
    }
    let clean = !counts.is_contaminated();

    if counts.works >= 1 {
        labels.push(Label::graded(Dependency::Path, Strength::Weak));
        if clean {
            labels.push(Label::graded(Dependency::Path, Strength::Strict));
            if counts.broken >= 2 {
                labels.push(Label::graded(Dependency::Path, Strength::Strong));
            }
        }
    } else {
        labels.push(Label::graded(Dependency::Site, Strength::Weak));
        if clean {
            labels.push(Label::graded(Dependency::Site, Strength::Strict));
            labels.push(Label::graded(Dependency::Site, Strength::Strong));
        }
    }
    labels
}

/// Labels for a group's counts under `variant`'s policy.
pub fn labels_for(variant: Variant, counts: &ConditionCounts) -> Vec<Label> {
    match variant {
        Variant::Path => classify_path(counts).into_iter().collect(),
        Variant::Super => classify_super(counts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn counts(
        works: usize,
        broken: usize,
        transient: usize,
        offline: usize,
        weird: usize,
    ) -> ConditionCounts {
        ConditionCounts {
            works,
            broken,
            transient,
            offline,
            weird,
        }
    }

    fn tags(labels: &[Label]) -> Vec<String> {
        labels.iter().map(Label::tag).collect()
    }

    #[test]
    fn tally_counts_duplicates() {
        let conditions = [
            Condition::aggregate(Category::Broken),
            Condition::aggregate(Category::Broken),
            Condition::aggregate(Category::Works),
            Condition::aggregate(Category::Weird),
        ];
        assert_eq!(ConditionCounts::tally(&conditions), counts(1, 2, 0, 0, 1));
    }

    #[test]
    fn path_policy() {
        assert_eq!(
            classify_path(&counts(1, 1, 0, 0, 0)).map(|l| l.tag()),
            Some("ecn.path_dependent".to_string())
        );
        assert_eq!(
            classify_path(&counts(0, 3, 0, 0, 0)).map(|l| l.tag()),
            Some("ecn.site_dependent".to_string())
        );
        assert_eq!(classify_path(&counts(4, 0, 0, 0, 0)), None);
        assert_eq!(classify_path(&counts(1, 1, 1, 0, 0)), None);
        assert_eq!(classify_path(&counts(1, 1, 0, 1, 0)), None);
    }

    #[test]
    fn super_path_tiers() {
        assert_eq!(
            tags(&classify_super(&counts(1, 2, 0, 0, 0))),
            vec![
                "ecn.path_dependent.weak",
                "ecn.path_dependent.strict",
                "ecn.path_dependent.strong"
            ]
        );
        assert_eq!(
            tags(&classify_super(&counts(3, 1, 0, 0, 0))),
            vec!["ecn.path_dependent.weak", "ecn.path_dependent.strict"]
        );
        assert_eq!(
            tags(&classify_super(&counts(1, 5, 0, 0, 1))),
            vec!["ecn.path_dependent.weak"]
        );
    }

    #[test]
    fn super_site_tiers() {
        assert_eq!(
            tags(&classify_super(&counts(0, 1, 0, 0, 0))),
            vec![
                "ecn.site_dependent.weak",
                "ecn.site_dependent.strict",
                "ecn.site_dependent.strong"
            ]
        );
        assert_eq!(
            tags(&classify_super(&counts(0, 2, 1, 0, 0))),
            vec!["ecn.site_dependent.weak"]
        );
    }

    #[test]
    fn super_without_broken_is_empty() {
        assert!(classify_super(&counts(5, 0, 0, 0, 0)).is_empty());
        assert!(classify_super(&counts(0, 0, 2, 2, 2)).is_empty());
    }

    #[test]
    fn tier_soundness_over_small_counts() {
        for works in 0..3 {
            for broken in 0..3 {
                for transient in 0..2 {
                    for offline in 0..2 {
                        for weird in 0..2 {
                            let c = counts(works, broken, transient, offline, weird);
                            let labels = classify_super(&c);
                            let has = |d, s| labels.contains(&Label::graded(d, s));

                            if has(Dependency::Path, Strength::Strong) {
                                assert!(has(Dependency::Path, Strength::Strict));
                            }
                            if has(Dependency::Path, Strength::Strict) {
                                assert!(has(Dependency::Path, Strength::Weak));
                            }
                            assert_eq!(
                                has(Dependency::Site, Strength::Strict),
                                has(Dependency::Site, Strength::Strong)
                            );
                            if transient > 0 || offline > 0 {
                                assert!(labels.iter().all(|l| {
                                    matches!(l.strength, Some(Strength::Weak))
                                }));
                            }
                            if broken == 0 {
                                assert!(labels.is_empty());
                            }
                        }
                    }
                }
            }
        }
    }
}
