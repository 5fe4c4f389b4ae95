//! Classification of one version transition.
//!
//! Works on entries that have already been bound. Each old entry is same,
//! modified or removed depending on its forward link. Each new entry that no
//! link targets is new. Stability changes are counted per linked pair.

use apitrail_core::{
    ApiEntry, CountMap, EntryCategory, SubmoduleKind, SubmoduleSnapshot, Tally, VersionSnapshot,
};
use serde::{Deserialize, Serialize};

/// Counts for one transition, or a sum of transitions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCounts {
    /// Linked with owner and signature unchanged.
    pub same: u64,
    /// Linked with a changed signature.
    pub modified: u64,
    /// Not linked to any entry of the next version.
    pub removed: u64,
    /// Not targeted by any link from the previous version.
    pub new: u64,
    /// Removed, excluding implementor listings of traits.
    pub true_removed: u64,
    /// New, excluding implementor listings of traits.
    pub true_new: u64,

    /// Same, unstable on both sides.
    pub unstable_same: u64,
    /// Modified, unstable on both sides.
    pub unstable_modified: u64,
    /// Removed while unstable.
    pub unstable_removed: u64,
    /// New and unstable.
    pub unstable_new: u64,

    /// Stable before, unstable after.
    pub late_unstable: u64,
    /// Unstable before, stable after.
    pub stabilized: u64,
    /// Unstable on both sides with no feature flag in common.
    pub change_ruf: u64,

    pub new_submodules: u64,
    pub removed_submodules: u64,
}

impl TransitionCounts {
    /// Entries seen on the old side.
    pub fn old_total(&self) -> u64 {
        self.same + self.modified + self.removed
    }

    /// Entries on the new side reached by a link.
    pub fn linked(&self) -> u64 {
        self.same + self.modified
    }
}

impl Tally for TransitionCounts {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        TransitionCounts {
            same: self.same + other.same,
            modified: self.modified + other.modified,
            removed: self.removed + other.removed,
            new: self.new + other.new,
            true_removed: self.true_removed + other.true_removed,
            true_new: self.true_new + other.true_new,
            unstable_same: self.unstable_same + other.unstable_same,
            unstable_modified: self.unstable_modified + other.unstable_modified,
            unstable_removed: self.unstable_removed + other.unstable_removed,
            unstable_new: self.unstable_new + other.unstable_new,
            late_unstable: self.late_unstable + other.late_unstable,
            stabilized: self.stabilized + other.stabilized,
            change_ruf: self.change_ruf + other.change_ruf,
            new_submodules: self.new_submodules + other.new_submodules,
            removed_submodules: self.removed_submodules + other.removed_submodules,
        }
    }
}

/// Removed and new entries split by document section and entry shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBreakdown {
    pub removed_by_group: CountMap<String>,
    pub new_by_group: CountMap<String>,
    pub removed_by_category: CountMap<EntryCategory>,
    pub new_by_category: CountMap<EntryCategory>,
}

impl ChangeBreakdown {
    fn record_removed(&mut self, entry: &ApiEntry) {
        self.removed_by_group.increment(entry.group_label.clone());
        self.removed_by_category.increment(entry.category());
    }

    fn record_new(&mut self, entry: &ApiEntry) {
        self.new_by_group.increment(entry.group_label.clone());
        self.new_by_category.increment(entry.category());
    }
}

impl Tally for ChangeBreakdown {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        ChangeBreakdown {
            removed_by_group: self.removed_by_group.combine(&other.removed_by_group),
            new_by_group: self.new_by_group.combine(&other.new_by_group),
            removed_by_category: self.removed_by_category.combine(&other.removed_by_category),
            new_by_category: self.new_by_category.combine(&other.new_by_category),
        }
    }
}

/// Classification result for a submodule or a whole version pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSummary {
    pub counts: TransitionCounts,
    pub breakdown: ChangeBreakdown,
}

impl Tally for TransitionSummary {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        TransitionSummary {
            counts: self.counts.combine(&other.counts),
            breakdown: self.breakdown.combine(&other.breakdown),
        }
    }
}

/// Configuration for transition classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Group labels of trait submodules whose entries are derived from other
    /// items. They are left out of `true_new` and `true_removed`.
    pub excluded_groups: Vec<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        ClassificationConfig {
            excluded_groups: vec![
                "Implementors".to_string(),
                "Blanket Implementations".to_string(),
            ],
        }
    }
}

/// Classifies bound version transitions.
#[derive(Clone, Debug, Default)]
pub struct Classifier {
    config: ClassificationConfig,
}

impl Classifier {
    pub fn new() -> Self {
        Classifier {
            config: ClassificationConfig::default(),
        }
    }

    pub fn with_config(config: ClassificationConfig) -> Self {
        Classifier { config }
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Whether `entry` of a submodule of `kind` is a passively derived listing.
    pub fn is_passive(&self, kind: SubmoduleKind, entry: &ApiEntry) -> bool {
        kind == SubmoduleKind::Trait
            && self
                .config
                .excluded_groups
                .iter()
                .any(|group| *group == entry.group_label)
    }

    fn removed(&self, kind: SubmoduleKind, entry: &ApiEntry, summary: &mut TransitionSummary) {
        let counts = &mut summary.counts;
        counts.removed += 1;
        if entry.is_unstable() {
            counts.unstable_removed += 1;
        }
        if !self.is_passive(kind, entry) {
            counts.true_removed += 1;
        }
        summary.breakdown.record_removed(entry);
    }

    fn introduced(&self, kind: SubmoduleKind, entry: &ApiEntry, summary: &mut TransitionSummary) {
        let counts = &mut summary.counts;
        counts.new += 1;
        if entry.is_unstable() {
            counts.unstable_new += 1;
        }
        if !self.is_passive(kind, entry) {
            counts.true_new += 1;
        }
        summary.breakdown.record_new(entry);
    }

    fn linked(old: &ApiEntry, new: &ApiEntry, counts: &mut TransitionCounts) {
        let (was_unstable, is_unstable) = (old.is_unstable(), new.is_unstable());

        if old.same_surface(new) {
            counts.same += 1;
            if was_unstable && is_unstable {
                counts.unstable_same += 1;
            }
        } else {
            counts.modified += 1;
            if was_unstable && is_unstable {
                counts.unstable_modified += 1;
            }
        }

        match (was_unstable, is_unstable) {
            (true, false) => counts.stabilized += 1,
            (false, true) => counts.late_unstable += 1,
            (true, true) if !old.shares_feature_flag(new) => counts.change_ruf += 1,
            _ => {}
        }
    }

    /// Classify one submodule. `new` is `None` when the submodule is gone.
    ///
    /// A link whose index is out of range for `new` counts as removed.
    /// The passive exclusion uses the kind of `old` for both removed and new
    /// entries, so a submodule that changes kind is judged by its earlier one.
    pub fn classify_submodule(
        &self,
        old: &SubmoduleSnapshot,
        new: Option<&SubmoduleSnapshot>,
    ) -> TransitionSummary {
        let mut summary = TransitionSummary::default();

        let Some(new) = new else {
            summary.counts.removed_submodules = 1;
            for entry in &old.entries {
                self.removed(old.kind, entry, &mut summary);
            }
            return summary;
        };

        let mut targeted = vec![false; new.entries.len()];
        for entry in &old.entries {
            let target = entry
                .forward_link
                .and_then(|link| new.entries.get(link.index).map(|t| (link.index, t)));
            match target {
                Some((index, target)) => {
                    targeted[index] = true;
                    Self::linked(entry, target, &mut summary.counts);
                }
                None => self.removed(old.kind, entry, &mut summary),
            }
        }

        for (entry, _) in new.entries.iter().zip(&targeted).filter(|(_, hit)| !**hit) {
            self.introduced(old.kind, entry, &mut summary);
        }

        summary
    }

    /// Classify a submodule that exists only in the new version.
    pub fn classify_added_submodule(&self, new: &SubmoduleSnapshot) -> TransitionSummary {
        let mut summary = TransitionSummary::default();
        summary.counts.new_submodules = 1;
        for entry in &new.entries {
            self.introduced(new.kind, entry, &mut summary);
        }
        summary
    }

    /// Classify every submodule of a bound version pair.
    pub fn classify_pair(&self, old: &VersionSnapshot, new: &VersionSnapshot) -> TransitionSummary {
        let mut summary = TransitionSummary::default();

        for path in old.paths() {
            if let Some(submodule) = old.get(path) {
                summary.absorb(&self.classify_submodule(submodule, new.get(path)));
            }
        }
        for path in new.paths() {
            if old.contains(path) {
                continue;
            }
            if let Some(submodule) = new.get(path) {
                summary.absorb(&self.classify_added_submodule(submodule));
            }
        }

        let counts = &summary.counts;
        tracing::debug!(
            from = %old.label,
            to = %new.label,
            same = counts.same,
            modified = counts.modified,
            removed = counts.removed,
            new = counts.new,
            "Classified transition"
        );
        summary
    }
}
