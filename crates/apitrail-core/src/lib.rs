//! # apitrail-core
//!
//! Snapshot model and stability normalization for apitrail.
//!
//! This crate provides:
//! - Entry, submodule and version records, addressable by position
//! - The ordered snapshot store with JSON (de)serialization
//! - Rule-based decoding of raw stability annotations
//! - Text cleanup for rendered signatures
//! - The `Tally` trait used for every statistic in the workspace
//!
//! ## Example
//!
//! ```rust
//! use apitrail_core::{ApiEntry, Normalizer, SnapshotStore, SubmoduleKind, SubmoduleSnapshot, VersionSnapshot};
//!
//! let mut store = SnapshotStore::new();
//! store.push(VersionSnapshot::new("1.0.0").with_submodule(
//!     SubmoduleSnapshot::new(SubmoduleKind::Struct, "std::cell::Cell").with_entry(
//!         ApiEntry::new("", "Methods", "impl<T> Cell<T>", "pub fn take(&self) -> T")
//!             .with_annotation("Unstable (move_cell #27731)"),
//!     ),
//! ));
//!
//! let diagnostics = store.normalize_stability(&Normalizer::new());
//! assert!(diagnostics.is_empty());
//! assert!(store.versions()[0].entry("std::cell::Cell", 0).unwrap().is_unstable());
//! ```

pub mod entry;
pub mod error;
pub mod stability;
pub mod store;
pub mod tally;
pub mod text;

pub use entry::{
    ApiEntry, EntryCategory, ForwardLink, LinkKind, SubmoduleKind, SubmoduleSnapshot,
    VersionSnapshot,
};
pub use error::{Result, StoreError};
pub use stability::{
    FactExtractor, Normalized, Normalizer, StabilityDiagnostic, StabilityFact, StabilityRule,
    StabilityStatus, UnhandledReason,
};
pub use store::SnapshotStore;
pub use tally::{CountMap, Tally};
pub use text::{clean_signature, clean_text};
