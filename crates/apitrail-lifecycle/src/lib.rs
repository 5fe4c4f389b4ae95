//! # apitrail-lifecycle
//!
//! Lifecycle classification over bound snapshots.
//!
//! - [`transition`]: same/modified/removed/new counts and stability changes
//!   for one adjacent version pair
//! - [`chain`]: per-API chains across the whole range, with the step at
//!   which each lifecycle event first occurred
//!
//! Both read forward links only; binding must run first.

pub mod chain;
pub mod transition;

pub use chain::{
    analyze, build_chains, ChainStep, ChainTerminal, LifecycleChain, LifecycleEvents,
    LifecycleSummary,
};
pub use transition::{
    ChangeBreakdown, ClassificationConfig, Classifier, TransitionCounts, TransitionSummary,
};
