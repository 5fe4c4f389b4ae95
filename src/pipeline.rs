//! The end-to-end analysis pipeline.
//!
//! Stages run strictly in version order:
//! 1. Version range selection
//! 2. Stability normalization
//! 3. Binding of every adjacent pair
//! 4. Transition classification, folded into the evolution report
//! 5. Duration distributions
//! 6. Lifecycle chains

use crate::config::AnalysisConfig;
use crate::error::Result;
use apitrail_binding::{BindStats, Binder};
use apitrail_core::{Normalizer, SnapshotStore, StabilityDiagnostic, StoreError};
use apitrail_lifecycle::{build_chains, Classifier, LifecycleChain, LifecycleSummary};
use apitrail_report::{DurationReport, EvolutionReport, VersionObservation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything one analysis run produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub evolution: EvolutionReport,
    pub durations: DurationReport,
    pub lifecycle: LifecycleSummary,
    pub chains: Vec<LifecycleChain>,
    /// Annotation sets the normalizer could not fully decode.
    pub diagnostics: Vec<StabilityDiagnostic>,
    pub binding: BindStats,
}

impl AnalysisReport {
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "API evolution")?;
        writeln!(f, "{}", self.evolution)?;
        writeln!(f, "Durations")?;
        writeln!(f, "{}", self.durations)?;
        writeln!(f, "Lifecycle")?;
        write!(f, "{}", self.lifecycle)?;
        writeln!(
            f,
            "\nlinks: {} exact, {} tolerant, {} unmatched; {} unhandled annotation sets",
            self.binding.exact,
            self.binding.tolerant,
            self.binding.unmatched + self.binding.orphaned_entries,
            self.diagnostics.len()
        )
    }
}

/// A configured analysis.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
    config: AnalysisConfig,
    normalizer: Normalizer,
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Analysis {
            config,
            normalizer: Normalizer::new(),
        }
    }

    /// Replace the stability rule set.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run on `store` in place.
    ///
    /// The store is narrowed to the configured range, and its links and
    /// durations are recomputed from scratch. It is left bound.
    pub fn run(&self, store: &mut SnapshotStore) -> Result<AnalysisReport> {
        self.config.validate()?;
        if store.is_empty() {
            return Err(StoreError::Empty.into());
        }

        if let Some(range) = self.config.range {
            store.retain_range(range.start, range.end)?;
            tracing::info!(start = range.start, end = range.end, "Selected version range");
        }

        let diagnostics = store.normalize_stability(&self.normalizer);
        tracing::info!(
            versions = store.len(),
            diagnostics = diagnostics.len(),
            "Normalized stability annotations"
        );

        store.reset_bindings();
        let binding = Binder::with_config(self.config.binding.clone()).bind_store(store);
        tracing::info!(
            exact = binding.exact,
            tolerant = binding.tolerant,
            unmatched = binding.unmatched,
            "Bound versions"
        );

        let classifier = Classifier::with_config(self.config.classification.clone());
        let mut evolution = EvolutionReport::new();
        for index in 0..store.len() {
            let version = store.require(index)?;
            let transition = match index.checked_sub(1) {
                Some(previous) => Some(classifier.classify_pair(store.require(previous)?, version)),
                None => None,
            };
            evolution = evolution.fold(VersionObservation::observe(version, transition));
        }
        tracing::info!(rows = evolution.len(), "Classified transitions");

        let durations = DurationReport::from_store(store);

        let chains = build_chains(store);
        let lifecycle = LifecycleSummary::from_chains(&chains);
        tracing::info!(chains = lifecycle.chains, removed = lifecycle.removed, "Built lifecycle chains");

        Ok(AnalysisReport {
            evolution,
            durations,
            lifecycle,
            chains,
            diagnostics,
            binding,
        })
    }

    /// Run on a copy of `store`, leaving it untouched.
    pub fn analyze(&self, store: &SnapshotStore) -> Result<AnalysisReport> {
        let mut copy = match self.config.range {
            Some(range) => store.select_range(range.start, range.end)?,
            None => store.clone(),
        };
        Analysis {
            config: AnalysisConfig {
                range: None,
                ..self.config.clone()
            },
            normalizer: self.normalizer.clone(),
        }
        .run(&mut copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use apitrail_core::{ApiEntry, SubmoduleKind, SubmoduleSnapshot, VersionSnapshot};

    fn version(label: &str, signatures: &[&str]) -> VersionSnapshot {
        VersionSnapshot::new(label).with_submodule(
            SubmoduleSnapshot::new(SubmoduleKind::Struct, "m").with_entries(
                signatures
                    .iter()
                    .map(|s| ApiEntry::new("", "Methods", "impl Foo", s)),
            ),
        )
    }

    #[test]
    fn test_empty_store() {
        let result = Analysis::default().run(&mut SnapshotStore::new());
        assert_eq!(result, Err(AnalysisError::Store(StoreError::Empty)));
    }

    #[test]
    fn test_single_version() {
        let mut store = SnapshotStore::from_versions([version("1.0.0", &["fn a()"])]);
        let report = Analysis::default().run(&mut store).unwrap();
        assert_eq!(report.evolution.len(), 1);
        assert!(report.chains.is_empty());
        assert_eq!(report.binding, BindStats::default());
    }

    #[test]
    fn test_analyze_leaves_store_untouched() {
        let store = SnapshotStore::from_versions([
            version("1.0.0", &["fn a()"]),
            version("1.1.0", &["fn a()"]),
            version("1.2.0", &[]),
        ]);
        let analysis = Analysis::new(AnalysisConfig::default().with_range(1, 2));

        let report = analysis.analyze(&store).unwrap();

        assert_eq!(report.evolution.rows()[0].version, "1.1.0");
        assert_eq!(report.evolution.totals().removed, 1);
        assert!(store.versions()[0].entry("m", 0).is_some_and(|e| !e.is_linked()));
    }

    #[test]
    fn test_range_out_of_bounds() {
        let mut store = SnapshotStore::from_versions([version("1.0.0", &[])]);
        let result = Analysis::new(AnalysisConfig::default().with_range(0, 5)).run(&mut store);
        assert!(matches!(
            result,
            Err(AnalysisError::Store(StoreError::InvalidRange { .. }))
        ));
    }
}
