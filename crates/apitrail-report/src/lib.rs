//! # apitrail-report
//!
//! Aggregation of classified transitions into per-version tables.
//!
//! Reports are values built by folding one version at a time, so several
//! analyses (different version ranges, different configurations) can run
//! side by side without sharing state.
//!
//! - [`EvolutionReport`]: same/modified/removed/new counts per version
//! - [`DurationReport`]: duration distributions per version and subset
//! - Both render as fixed-width tables through `Display` and export
//!   through serde

pub mod duration;
pub mod evolution;
pub mod table;

pub use duration::{
    DistributionSummary, DurationDistribution, DurationReport, DurationSubset, DurationSubsets,
    VersionDurations,
};
pub use evolution::{EvolutionReport, UnstableRow, VersionObservation, VersionRow};
