//! Example: API evolution report over a short synthetic history
//!
//! This example demonstrates:
//! 1. Building version snapshots with raw stability annotations
//! 2. Running the full analysis and printing the tables
//! 3. Inspecting one lifecycle chain
//! 4. Re-running a sub-range with a different duration policy
//!
//! Run with `RUST_LOG=debug` to see per-pair binding counts.

use apitrail::binding::{BindingConfig, DurationPolicy};
use apitrail::model::{ApiEntry, SnapshotStore, SubmoduleKind, SubmoduleSnapshot, VersionSnapshot};
use apitrail::{Analysis, AnalysisConfig};
use tracing_subscriber::EnvFilter;

fn vec_methods(version: u32) -> SubmoduleSnapshot {
    let method = |signature: &str| ApiEntry::new("", "Methods", "impl<T> Vec<T>", signature);

    let mut entries = vec![
        method("pub fn len(&self) -> usize"),
        method("pub fn push(&mut self, value: T)"),
    ];
    match version {
        0 => entries.push(
            method("pub fn drain_filter<F>(&mut self, filter: F) -> DrainFilter<T, F>")
                .with_annotation("Unstable (drain_filter #43244)"),
        ),
        1 => entries.push(
            method("pub fn drain_filter<F>(&mut self, pred: F) -> DrainFilter<'_, T, F>")
                .with_annotation("🔬 This is a nightly-only experimental API. (drain_filter #43244)"),
        ),
        2 => entries.push(
            method("pub fn extract_if<F>(&mut self, filter: F) -> ExtractIf<'_, T, F>")
                .with_annotation("🔬 This is a nightly-only experimental API. (extract_if #43244)"),
        ),
        _ => entries.push(method("pub fn extract_if<F>(&mut self, filter: F) -> ExtractIf<'_, T, F>")),
    }
    if version < 2 {
        entries.push(
            method("pub fn remove_item(&mut self, item: &T) -> Option<T>")
                .with_annotation("Deprecated since 1.46.0: Removed in favor of `retain`"),
        );
    }

    SubmoduleSnapshot::new(SubmoduleKind::Struct, "alloc::vec::Vec")
        .with_container_signature("pub struct Vec<T, A: Allocator = Global>")
        .with_entries(entries)
}

fn history() -> SnapshotStore {
    SnapshotStore::from_versions((0..4).map(|i| {
        VersionSnapshot::new(format!("1.{}.0", 70 + i)).with_submodule(vec_methods(i))
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  API Evolution Report");
    println!("═══════════════════════════════════════════════════════════════\n");

    let mut store = history();
    let report = Analysis::new(AnalysisConfig::default()).run(&mut store)?;
    println!("{}", report);

    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Lifecycle of Vec::drain_filter                              │");
    println!("└─────────────────────────────────────────────────────────────┘\n");

    if let Some(chain) = report.chains.iter().find(|c| c.steps[0].index == 2) {
        for (step, entry) in chain.steps.iter().zip(chain.entries(&store)) {
            let label = &store.versions()[step.version].label;
            println!("  {:<8} {}", label, entry.signature);
        }
        println!("  terminal: {:?}", chain.terminal);
        println!("  events:   {:?}\n", chain.events);
    }

    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Versions 1.71.0..=1.73.0, every link extends duration       │");
    println!("└─────────────────────────────────────────────────────────────┘\n");

    let config = AnalysisConfig::default()
        .with_range(1, 3)
        .with_binding(BindingConfig {
            duration_policy: DurationPolicy::AllLinks,
            ..Default::default()
        });
    let report = Analysis::new(config).analyze(&history())?;
    println!("{}", report.durations);

    Ok(())
}
