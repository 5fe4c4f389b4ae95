//! Duration distributions per version and stability subset.

use apitrail_core::{ApiEntry, CountMap, SnapshotStore, Tally, VersionSnapshot};
use serde::{Deserialize, Serialize};

/// Total and mean of a distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub total: u64,
    /// 0.0 when `total` is zero.
    pub average: f64,
}

/// Number of entries per duration value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationDistribution {
    counts: CountMap<u32>,
}

impl DurationDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, duration: u32) {
        self.counts.increment(duration);
    }

    /// Entries with exactly `duration`.
    pub fn count(&self, duration: u32) -> u64 {
        self.counts.get(&duration)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.counts.iter().map(|(&d, &c)| (d, c))
    }

    pub fn summary(&self) -> DistributionSummary {
        let total = self.counts.total();
        if total == 0 {
            return DistributionSummary::default();
        }
        let weighted: u64 = self.iter().map(|(d, c)| d as u64 * c).sum();
        DistributionSummary {
            total,
            average: weighted as f64 / total as f64,
        }
    }
}

impl FromIterator<u32> for DurationDistribution {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        DurationDistribution {
            counts: iter.into_iter().collect(),
        }
    }
}

impl Tally for DurationDistribution {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        DurationDistribution {
            counts: self.counts.combine(&other.counts),
        }
    }
}

/// Which entries a distribution covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSubset {
    All,
    /// Unmatched in the next version.
    Removed,
    Unstable,
    UnstableRemoved,
}

impl DurationSubset {
    pub const ALL: [DurationSubset; 4] = [
        DurationSubset::All,
        DurationSubset::Removed,
        DurationSubset::Unstable,
        DurationSubset::UnstableRemoved,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DurationSubset::All => "all",
            DurationSubset::Removed => "removed",
            DurationSubset::Unstable => "unstable",
            DurationSubset::UnstableRemoved => "unstable_removed",
        }
    }
}

/// The four subset distributions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSubsets {
    pub all: DurationDistribution,
    pub removed: DurationDistribution,
    pub unstable: DurationDistribution,
    pub unstable_removed: DurationDistribution,
}

impl DurationSubsets {
    /// Record one entry. Removal is only known when a next version exists.
    pub fn record(&mut self, entry: &ApiEntry, has_successor: bool) {
        let removed = has_successor && !entry.is_linked();
        let unstable = entry.is_unstable();

        self.all.record(entry.duration);
        if removed {
            self.removed.record(entry.duration);
        }
        if unstable {
            self.unstable.record(entry.duration);
        }
        if unstable && removed {
            self.unstable_removed.record(entry.duration);
        }
    }

    pub fn get(&self, subset: DurationSubset) -> &DurationDistribution {
        match subset {
            DurationSubset::All => &self.all,
            DurationSubset::Removed => &self.removed,
            DurationSubset::Unstable => &self.unstable,
            DurationSubset::UnstableRemoved => &self.unstable_removed,
        }
    }
}

impl Tally for DurationSubsets {
    fn empty() -> Self {
        Self::default()
    }

    fn combine(&self, other: &Self) -> Self {
        DurationSubsets {
            all: self.all.combine(&other.all),
            removed: self.removed.combine(&other.removed),
            unstable: self.unstable.combine(&other.unstable),
            unstable_removed: self.unstable_removed.combine(&other.unstable_removed),
        }
    }
}

/// Duration distributions of one version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDurations {
    pub version: String,
    pub subsets: DurationSubsets,
}

impl VersionDurations {
    /// Observe every entry of a bound version.
    pub fn observe(version: &VersionSnapshot, has_successor: bool) -> Self {
        let mut subsets = DurationSubsets::default();
        for submodule in version.submodules.values() {
            for entry in &submodule.entries {
                subsets.record(entry, has_successor);
            }
        }
        VersionDurations {
            version: version.label.clone(),
            subsets,
        }
    }
}

/// Duration distributions for every version of a range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationReport {
    versions: Vec<VersionDurations>,
}

impl DurationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a bound store.
    pub fn from_store(store: &SnapshotStore) -> Self {
        let last = store.len().saturating_sub(1);
        let report = store
            .versions()
            .iter()
            .enumerate()
            .map(|(index, version)| VersionDurations::observe(version, index < last))
            .fold(DurationReport::new(), DurationReport::fold);
        tracing::debug!(versions = report.len(), "Computed duration distributions");
        report
    }

    pub fn fold(mut self, version: VersionDurations) -> Self {
        self.versions.push(version);
        self
    }

    pub fn versions(&self) -> &[VersionDurations] {
        &self.versions
    }

    pub fn version(&self, label: &str) -> Option<&VersionDurations> {
        self.versions.iter().find(|v| v.version == label)
    }

    /// Distributions summed over every version.
    pub fn overall(&self) -> DurationSubsets {
        apitrail_core::tally::sum(self.versions.iter().map(|v| &v.subsets))
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
