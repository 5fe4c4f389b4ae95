//! Forward link assignment between adjacent versions.
//!
//! For every old entry the binder scans the new entry list in order and
//! links the first exact match, or failing that the first tolerant match.
//! A link, once set, is never replaced. Running the binder twice over the
//! same pair therefore leaves the links untouched.

use crate::identity::{is_exact, is_tolerant};
use apitrail_core::{
    ApiEntry, ForwardLink, LinkKind, SnapshotStore, Tally, VersionSnapshot,
};
use serde::{Deserialize, Serialize};

/// Which links extend an entry's duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Only exact links; duration counts versions with an unchanged surface.
    #[default]
    ExactLinksOnly,
    /// Exact and tolerant links.
    AllLinks,
}

impl DurationPolicy {
    pub fn propagates(&self, kind: LinkKind) -> bool {
        match self {
            DurationPolicy::ExactLinksOnly => kind == LinkKind::Exact,
            DurationPolicy::AllLinks => true,
        }
    }
}

/// Configuration for entry binding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Fall back to function-name matching when no exact match exists.
    pub tolerant_matching: bool,

    pub duration_policy: DurationPolicy,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            tolerant_matching: true,
            duration_policy: DurationPolicy::ExactLinksOnly,
        }
    }
}

/// Counts of binding decisions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindStats {
    /// Links made by exact identity.
    pub exact: u64,

    /// Links made by tolerant identity.
    pub tolerant: u64,

    /// Entries scanned without finding a match.
    pub unmatched: u64,

    /// Entries skipped because they were already linked.
    pub already_bound: u64,

    /// Submodules missing from the next version.
    pub orphaned_submodules: u64,

    /// Entries of orphaned submodules. These are never scanned.
    pub orphaned_entries: u64,
}

impl BindStats {
    /// Links made in this run.
    pub fn linked(&self) -> u64 {
        self.exact + self.tolerant
    }
}

impl Tally for BindStats {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        BindStats {
            exact: self.exact + other.exact,
            tolerant: self.tolerant + other.tolerant,
            unmatched: self.unmatched + other.unmatched,
            already_bound: self.already_bound + other.already_bound,
            orphaned_submodules: self.orphaned_submodules + other.orphaned_submodules,
            orphaned_entries: self.orphaned_entries + other.orphaned_entries,
        }
    }
}

/// Assigns forward links and propagates durations.
#[derive(Clone, Debug, Default)]
pub struct Binder {
    config: BindingConfig,
}

impl Binder {
    /// Create a binder with the default configuration.
    pub fn new() -> Self {
        Binder {
            config: BindingConfig::default(),
        }
    }

    /// Create a binder with custom configuration.
    pub fn with_config(config: BindingConfig) -> Self {
        Binder { config }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// The link `old` would receive against `candidates`.
    pub fn find_target(&self, old: &ApiEntry, candidates: &[ApiEntry]) -> Option<ForwardLink> {
        if let Some(index) = candidates.iter().position(|new| is_exact(old, new)) {
            return Some(ForwardLink::exact(index));
        }
        if !self.config.tolerant_matching {
            return None;
        }
        candidates
            .iter()
            .position(|new| is_tolerant(old, new))
            .map(ForwardLink::tolerant)
    }

    /// Link the entries of one submodule to its next version.
    pub fn bind_entries(&self, old: &mut [ApiEntry], new: &mut [ApiEntry]) -> BindStats {
        let mut stats = BindStats::default();

        for (position, entry) in old.iter_mut().enumerate() {
            if let Some(link) = entry.forward_link {
                stats.already_bound += 1;
                // Re-running must not lose propagation done on the first pass.
                if let Some(target) = new.get_mut(link.index) {
                    self.propagate(entry, link, target);
                }
                continue;
            }

            let Some(link) = self.find_target(entry, new) else {
                stats.unmatched += 1;
                continue;
            };

            tracing::trace!(
                submodule = %entry.submodule_path,
                from = position,
                to = link.index,
                kind = ?link.kind,
                "Linked entry"
            );
            entry.forward_link = Some(link);
            self.propagate(entry, link, &mut new[link.index]);
            match link.kind {
                LinkKind::Exact => stats.exact += 1,
                LinkKind::Tolerant => stats.tolerant += 1,
            }
        }

        stats
    }

    fn propagate(&self, entry: &ApiEntry, link: ForwardLink, target: &mut ApiEntry) {
        target.has_predecessor = true;
        if self.config.duration_policy.propagates(link.kind) {
            target.duration = target.duration.max(entry.duration + 1);
        }
    }

    /// Link every submodule of `old` to `new`.
    ///
    /// Submodules absent from `new` are left entirely unmatched.
    pub fn bind_versions(&self, old: &mut VersionSnapshot, new: &mut VersionSnapshot) -> BindStats {
        let mut stats = BindStats::default();

        for (path, submodule) in old.submodules.iter_mut() {
            match new.submodules.get_mut(path) {
                Some(next) => {
                    stats.absorb(&self.bind_entries(&mut submodule.entries, &mut next.entries));
                }
                None => {
                    tracing::debug!(
                        submodule = %path,
                        entries = submodule.entries.len(),
                        "Submodule missing from next version"
                    );
                    stats.orphaned_submodules += 1;
                    stats.orphaned_entries += submodule.entries.len() as u64;
                }
            }
        }

        stats
    }

    /// Bind every adjacent pair of the store in increasing version order.
    pub fn bind_store(&self, store: &mut SnapshotStore) -> BindStats {
        let mut total = BindStats::default();

        for index in 0..store.len().saturating_sub(1) {
            let Some((old, new)) = store.pair_mut(index) else {
                break;
            };
            let stats = self.bind_versions(old, new);
            tracing::debug!(
                from = %old.label,
                to = %new.label,
                exact = stats.exact,
                tolerant = stats.tolerant,
                unmatched = stats.unmatched,
                orphaned = stats.orphaned_entries,
                "Bound version pair"
            );
            total.absorb(&stats);
        }

        total
    }
}
