//! # apitrail
//!
//! Tracks how the public surface of a versioned API catalog evolves.
//!
//! Given an ordered sequence of version snapshots, each listing submodules
//! and their API entries with raw stability annotations, apitrail:
//! - decodes the annotations into unstable/deprecated facts
//! - links every entry to its counterpart in the next version
//! - classifies each transition as same, modified, removed or new
//! - follows every API across versions and records its lifecycle events
//! - aggregates the results into per-version tables
//!
//! ## Crates
//!
//! - `apitrail-core`: snapshot model, store and stability normalization
//! - `apitrail-binding`: cross-version entry binding
//! - `apitrail-lifecycle`: transition classification and lifecycle chains
//! - `apitrail-report`: evolution and duration reports
//!
//! ## Example
//!
//! ```rust
//! use apitrail::{Analysis, AnalysisConfig};
//! use apitrail::model::{ApiEntry, SnapshotStore, SubmoduleKind, SubmoduleSnapshot, VersionSnapshot};
//!
//! let version = |label: &str, signature: &str| {
//!     VersionSnapshot::new(label).with_submodule(
//!         SubmoduleSnapshot::new(SubmoduleKind::Struct, "std::cell::Cell")
//!             .with_entry(ApiEntry::new("", "Methods", "impl<T> Cell<T>", signature)),
//!     )
//! };
//! let mut store = SnapshotStore::from_versions([
//!     version("1.16.0", "pub fn get(&self) -> T"),
//!     version("1.17.0", "pub fn get(&self) -> T"),
//! ]);
//!
//! let report = Analysis::new(AnalysisConfig::default()).run(&mut store).unwrap();
//! assert_eq!(report.evolution.totals().same, 1);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

pub use apitrail_binding as binding;
pub use apitrail_core as model;
pub use apitrail_lifecycle as lifecycle;
pub use apitrail_report as report;

pub use config::{AnalysisConfig, VersionRange};
pub use error::{AnalysisError, Result};
pub use pipeline::{Analysis, AnalysisReport};
