//! Multi-version lifecycle chains.
//!
//! A chain starts at an entry with no predecessor and follows forward links
//! until an entry is unmatched or the last version is reached. Events are
//! recorded as the chain-relative step at which they first occur.

use apitrail_core::{ApiEntry, SnapshotStore, Tally};
use serde::{Deserialize, Serialize};

/// Position of one chain entry in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainStep {
    /// Version index in the store.
    pub version: usize,
    /// Entry index in that version's submodule.
    pub index: usize,
}

/// How a chain ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChainTerminal {
    /// Absent from `version`, the version after its last step.
    Removed { version: usize },
    /// Still present in the final version.
    Ongoing,
}

/// Step index of the first occurrence of each lifecycle event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvents {
    pub unstable: Option<usize>,
    pub stabilized: Option<usize>,
    pub deprecated: Option<usize>,
    pub late_unstable: Option<usize>,
    /// Went unstable again after having been unstable before.
    pub unstable_twice: Option<usize>,
    pub change_ruf: Option<usize>,
    pub revoked_deprecated: Option<usize>,
    /// Last step of a removed chain whose final entry carried no deprecation.
    pub not_deprecated_before_removed: Option<usize>,
}

fn first(slot: &mut Option<usize>, step: usize) {
    if slot.is_none() {
        *slot = Some(step);
    }
}

/// Compute the events of a chain from its entries in order.
///
/// Events comparing two steps are recorded at the earlier one.
pub fn analyze(entries: &[&ApiEntry], removed: bool) -> LifecycleEvents {
    let mut events = LifecycleEvents::default();

    for (step, entry) in entries.iter().enumerate() {
        let unstable = entry.is_unstable();
        let deprecated = entry.is_deprecated();
        if unstable {
            first(&mut events.unstable, step);
        }
        if deprecated {
            first(&mut events.deprecated, step);
        }

        let Some(next) = entries.get(step + 1) else {
            break;
        };
        match (unstable, next.is_unstable()) {
            (true, false) => first(&mut events.stabilized, step),
            (false, true) => {
                if events.unstable.is_some() {
                    first(&mut events.unstable_twice, step);
                }
                first(&mut events.late_unstable, step);
            }
            (true, true) if !entry.shares_feature_flag(next) => {
                first(&mut events.change_ruf, step)
            }
            _ => {}
        }
        if deprecated && !next.is_deprecated() {
            first(&mut events.revoked_deprecated, step);
        }
    }

    if removed {
        if let Some(last) = entries.last() {
            if !last.is_deprecated() {
                events.not_deprecated_before_removed = Some(entries.len() - 1);
            }
        }
    }

    events
}

/// One logical API followed across versions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleChain {
    pub submodule_path: String,
    pub steps: Vec<ChainStep>,
    pub terminal: ChainTerminal,
    pub events: LifecycleEvents,
}

impl LifecycleChain {
    /// Version index of the first appearance.
    pub fn start_version(&self) -> usize {
        self.steps.first().map(|s| s.version).unwrap_or(0)
    }

    /// Number of versions the chain spans.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_removed(&self) -> bool {
        matches!(self.terminal, ChainTerminal::Removed { .. })
    }

    /// The chain's entries, resolved against `store`.
    pub fn entries<'a>(&self, store: &'a SnapshotStore) -> Vec<&'a ApiEntry> {
        self.steps
            .iter()
            .filter_map(|step| {
                store
                    .version(step.version)
                    .and_then(|v| v.entry(&self.submodule_path, step.index))
            })
            .collect()
    }
}

/// Build every chain of a bound store.
///
/// Chains start in every version except the last, in version order, then
/// submodule path order, then entry order.
pub fn build_chains(store: &SnapshotStore) -> Vec<LifecycleChain> {
    let mut chains = Vec::new();
    let last = store.len().saturating_sub(1);

    for (start, version) in store.versions().iter().enumerate().take(last) {
        for path in version.paths() {
            let Some(submodule) = version.get(path) else {
                continue;
            };
            for (index, entry) in submodule.entries.iter().enumerate() {
                if entry.is_first_appearance() {
                    chains.push(follow(store, path, ChainStep { version: start, index }, entry));
                }
            }
        }
    }

    tracing::debug!(chains = chains.len(), "Built lifecycle chains");
    chains
}

fn follow<'a>(
    store: &'a SnapshotStore,
    path: &str,
    start: ChainStep,
    head: &'a ApiEntry,
) -> LifecycleChain {
    let mut steps = vec![start];
    let mut entries = vec![head];
    let mut current = head;
    let mut step = start;

    while let Some(link) = current.forward_link {
        let next_version = step.version + 1;
        let Some(next) = store.version(next_version).and_then(|v| v.entry(path, link.index)) else {
            break;
        };
        step = ChainStep {
            version: next_version,
            index: link.index,
        };
        steps.push(step);
        entries.push(next);
        current = next;
    }

    let terminal = if step.version + 1 >= store.len() {
        ChainTerminal::Ongoing
    } else {
        ChainTerminal::Removed {
            version: step.version + 1,
        }
    };
    let events = analyze(&entries, matches!(terminal, ChainTerminal::Removed { .. }));

    LifecycleChain {
        submodule_path: path.to_string(),
        steps,
        terminal,
        events,
    }
}

/// Number of chains for which each event occurred.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSummary {
    pub chains: u64,
    pub unstable: u64,
    pub stabilized: u64,
    pub deprecated: u64,
    pub removed: u64,
    pub change_ruf: u64,
    pub late_unstable: u64,
    pub unstable_twice: u64,
    pub not_deprecated_before_removed: u64,
    pub revoked_deprecated: u64,
}

impl LifecycleSummary {
    pub fn observe(&mut self, chain: &LifecycleChain) {
        let events = &chain.events;
        let count = |event: Option<usize>| event.is_some() as u64;

        self.chains += 1;
        self.removed += chain.is_removed() as u64;
        self.unstable += count(events.unstable);
        self.stabilized += count(events.stabilized);
        self.deprecated += count(events.deprecated);
        self.change_ruf += count(events.change_ruf);
        self.late_unstable += count(events.late_unstable);
        self.unstable_twice += count(events.unstable_twice);
        self.not_deprecated_before_removed += count(events.not_deprecated_before_removed);
        self.revoked_deprecated += count(events.revoked_deprecated);
    }

    pub fn from_chains<'a>(chains: impl IntoIterator<Item = &'a LifecycleChain>) -> Self {
        let mut summary = Self::default();
        for chain in chains {
            summary.observe(chain);
        }
        summary
    }
}

impl Tally for LifecycleSummary {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        LifecycleSummary {
            chains: self.chains + other.chains,
            unstable: self.unstable + other.unstable,
            stabilized: self.stabilized + other.stabilized,
            deprecated: self.deprecated + other.deprecated,
            removed: self.removed + other.removed,
            change_ruf: self.change_ruf + other.change_ruf,
            late_unstable: self.late_unstable + other.late_unstable,
            unstable_twice: self.unstable_twice + other.unstable_twice,
            not_deprecated_before_removed: self.not_deprecated_before_removed
                + other.not_deprecated_before_removed,
            revoked_deprecated: self.revoked_deprecated + other.revoked_deprecated,
        }
    }
}

impl std::fmt::Display for LifecycleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = [
            ("chains", self.chains),
            ("unstable", self.unstable),
            ("stabilized", self.stabilized),
            ("deprecated", self.deprecated),
            ("removed", self.removed),
            ("change_ruf", self.change_ruf),
            ("late_unstable", self.late_unstable),
            ("unstable_twice", self.unstable_twice),
            ("not_deprecated_before_removed", self.not_deprecated_before_removed),
            ("revoked_deprecated", self.revoked_deprecated),
        ];
        for (name, value) in rows {
            writeln!(f, "{:<30} {:>10}", name, value)?;
        }
        Ok(())
    }
}
