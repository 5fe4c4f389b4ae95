//! Version-indexed evolution table, built as a fold over observations.

use apitrail_core::{Tally, VersionSnapshot};
use apitrail_lifecycle::{ChangeBreakdown, TransitionCounts, TransitionSummary};
use serde::{Deserialize, Serialize};

/// Everything the report needs to know about one version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionObservation {
    pub version: String,
    pub api_count: u64,
    pub unstable_api_count: u64,
    /// Classification of the transition into this version. `None` for the
    /// first version of the range.
    pub transition: Option<TransitionSummary>,
}

impl VersionObservation {
    pub fn observe(version: &VersionSnapshot, transition: Option<TransitionSummary>) -> Self {
        VersionObservation {
            version: version.label.clone(),
            api_count: version.entry_count() as u64,
            unstable_api_count: version.unstable_entry_count() as u64,
            transition,
        }
    }
}

/// Unstable-only columns of a row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstableRow {
    pub api_count: u64,
    pub same: u64,
    pub modified: u64,
    pub removed: u64,
    pub new: u64,
}

/// One row of the evolution table.
///
/// Change columns describe the transition from the previous version into
/// this one; they are zero for the first row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRow {
    pub version: String,
    pub api_count: u64,
    pub same: u64,
    pub modified: u64,
    pub removed: u64,
    pub new: u64,
    pub true_removed: u64,
    pub true_new: u64,
    pub unstable: UnstableRow,
    pub late_unstable: u64,
    pub stabilized: u64,
    pub change_ruf: u64,
}

impl VersionRow {
    fn from_observation(observation: &VersionObservation) -> Self {
        let counts = observation
            .transition
            .as_ref()
            .map(|t| t.counts.clone())
            .unwrap_or_default();

        VersionRow {
            version: observation.version.clone(),
            api_count: observation.api_count,
            same: counts.same,
            modified: counts.modified,
            removed: counts.removed,
            new: counts.new,
            true_removed: counts.true_removed,
            true_new: counts.true_new,
            unstable: UnstableRow {
                api_count: observation.unstable_api_count,
                same: counts.unstable_same,
                modified: counts.unstable_modified,
                removed: counts.unstable_removed,
                new: counts.unstable_new,
            },
            late_unstable: counts.late_unstable,
            stabilized: counts.stabilized,
            change_ruf: counts.change_ruf,
        }
    }
}

/// The evolution table plus running totals over every transition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionReport {
    rows: Vec<VersionRow>,
    totals: TransitionCounts,
    breakdown: ChangeBreakdown,
}

impl EvolutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next version.
    pub fn fold(mut self, observation: VersionObservation) -> Self {
        self.rows.push(VersionRow::from_observation(&observation));
        if let Some(transition) = &observation.transition {
            self.totals.absorb(&transition.counts);
            self.breakdown.absorb(&transition.breakdown);
        }
        self
    }

    pub fn rows(&self) -> &[VersionRow] {
        &self.rows
    }

    pub fn row(&self, version: &str) -> Option<&VersionRow> {
        self.rows.iter().find(|r| r.version == version)
    }

    /// Sum of every transition's counts.
    pub fn totals(&self) -> &TransitionCounts {
        &self.totals
    }

    pub fn breakdown(&self) -> &ChangeBreakdown {
        &self.breakdown
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<VersionObservation> for EvolutionReport {
    fn from_iter<I: IntoIterator<Item = VersionObservation>>(iter: I) -> Self {
        iter.into_iter().fold(EvolutionReport::new(), EvolutionReport::fold)
    }
}
