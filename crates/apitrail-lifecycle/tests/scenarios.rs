//! Transition and chain scenarios over freshly bound snapshots.
//!
//! These tests verify:
//!  - The reference scenarios for same, modified, removed and stability changes
//!  - Exhaustiveness: every old entry is same, modified or removed
//!  - Every new entry is either a link target or new
//!  - Removal completeness between classification and chains

use apitrail_binding::Binder;
use apitrail_core::{
    ApiEntry, SnapshotStore, StabilityFact, SubmoduleKind, SubmoduleSnapshot, VersionSnapshot,
};
use apitrail_lifecycle::{build_chains, ChainTerminal, Classifier, TransitionCounts};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Helpers
// ============================================================================

fn entry(signature: &str) -> ApiEntry {
    ApiEntry::new("m", "Methods", "impl Foo", signature)
}

fn unstable(signature: &str, flag: &str) -> ApiEntry {
    entry(signature).with_fact(StabilityFact::unstable(flag, format!("Unstable ({})", flag)))
}

fn bound_store(versions: Vec<Vec<ApiEntry>>) -> SnapshotStore {
    let mut store = SnapshotStore::from_versions(versions.into_iter().enumerate().map(|(i, entries)| {
        VersionSnapshot::new(format!("1.{}.0", i))
            .with_submodule(SubmoduleSnapshot::new(SubmoduleKind::Struct, "m").with_entries(entries))
    }));
    Binder::new().bind_store(&mut store);
    store
}

fn transition(store: &SnapshotStore, index: usize) -> TransitionCounts {
    Classifier::new()
        .classify_pair(&store.versions()[index], &store.versions()[index + 1])
        .counts
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_unchanged_entry_is_same() {
    let store = bound_store(vec![vec![entry("fn bar()")], vec![entry("fn bar()")]]);
    let counts = transition(&store, 0);
    assert_eq!((counts.same, counts.modified, counts.removed, counts.new), (1, 0, 0, 0));
}

#[test]
fn test_parameter_change_is_modified() {
    let store = bound_store(vec![
        vec![entry("fn bar(x: i32)")],
        vec![entry("fn bar(x: i32, y: i32)")],
    ]);
    let counts = transition(&store, 0);
    assert_eq!((counts.same, counts.modified, counts.removed, counts.new), (0, 1, 0, 0));
}

#[test]
fn test_removed_entry_chain_never_deprecated() {
    let store = bound_store(vec![vec![entry("fn bar()")], vec![]]);
    let counts = transition(&store, 0);
    assert_eq!((counts.same, counts.modified, counts.removed, counts.new), (0, 0, 1, 0));

    let chains = build_chains(&store);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].terminal, ChainTerminal::Removed { version: 1 });
    assert_eq!(chains[0].events.not_deprecated_before_removed, Some(0));
}

#[test]
fn test_feature_flag_change_is_change_ruf() {
    let store = bound_store(vec![
        vec![unstable("fn bar()", "feature_x")],
        vec![unstable("fn bar()", "feature_y")],
    ]);
    let counts = transition(&store, 0);
    assert_eq!(counts.change_ruf, 1);
    assert_eq!(counts.unstable_same, 1);
}

#[test]
fn test_restabilized_then_unstable_again() {
    let store = bound_store(vec![
        vec![unstable("fn bar()", "feature_x")],
        vec![entry("fn bar()")],
        vec![unstable("fn bar()", "feature_x")],
    ]);

    assert_eq!(transition(&store, 0).stabilized, 1);
    assert_eq!(transition(&store, 1).late_unstable, 1);

    let chains = build_chains(&store);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].terminal, ChainTerminal::Ongoing);
    assert_eq!(chains[0].events.stabilized, Some(0));
    assert_eq!(chains[0].events.unstable_twice, Some(1));
}

#[test]
fn test_tolerant_link_continues_chain() {
    let store = bound_store(vec![
        vec![entry("fn bar(x: u8)")],
        vec![entry("fn bar(x: u16)")],
        vec![entry("fn bar(x: u16)")],
    ]);

    let chains = build_chains(&store);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].len(), 3);
    // Exact links only extend duration.
    assert_eq!(store.versions()[2].entry("m", 0).map(|e| e.duration), Some(1));
}

// ============================================================================
// Properties
// ============================================================================

fn entry_strategy() -> impl Strategy<Value = ApiEntry> {
    let name = prop::sample::select(vec!["get", "set", "len", "push"]);
    let params = prop::sample::select(vec!["", "x: u8"]);
    let flag = prop::option::of(prop::sample::select(vec!["fa", "fb"]));
    (name, params, flag).prop_map(|(name, params, flag)| {
        let e = entry(&format!("fn {}({})", name, params));
        match flag {
            Some(flag) => e.with_fact(StabilityFact::unstable(flag, format!("Unstable ({})", flag))),
            None => e,
        }
    })
}

fn store_strategy() -> impl Strategy<Value = SnapshotStore> {
    prop::collection::vec(prop::collection::vec(entry_strategy(), 0..6), 2..6).prop_map(bound_store)
}

proptest! {
    #[test]
    fn classification_is_exhaustive(store in store_strategy()) {
        for index in 0..store.len() - 1 {
            let counts = transition(&store, index);
            let old = &store.versions()[index].get("m").unwrap().entries;
            let new = &store.versions()[index + 1].get("m").unwrap().entries;

            prop_assert_eq!(counts.old_total(), old.len() as u64);

            let targets: HashSet<usize> =
                old.iter().filter_map(|e| e.forward_link).map(|l| l.index).collect();
            prop_assert_eq!(targets.len() as u64 + counts.new, new.len() as u64);
            prop_assert!(counts.unstable_same <= counts.same);
            prop_assert!(counts.unstable_removed <= counts.removed);
        }
    }

    #[test]
    fn removed_chains_match_removed_entries(store in store_strategy()) {
        // Chains that share a link target also share their last step.
        let removed_ends: HashSet<(usize, usize)> = build_chains(&store)
            .iter()
            .filter(|c| c.is_removed())
            .filter_map(|c| c.steps.last().map(|s| (s.version, s.index)))
            .collect();

        let removed: u64 = (0..store.len() - 1).map(|index| transition(&store, index).removed).sum();
        prop_assert_eq!(removed_ends.len() as u64, removed);
    }

    #[test]
    fn chains_cover_every_non_final_entry(store in store_strategy()) {
        let chains = build_chains(&store);
        let covered: HashSet<(usize, usize)> = chains
            .iter()
            .flat_map(|c| c.steps.iter().map(|s| (s.version, s.index)))
            .collect();

        for index in 0..store.len() - 1 {
            let count = store.versions()[index].get("m").unwrap().entries.len();
            for position in 0..count {
                prop_assert!(covered.contains(&(index, position)));
            }
        }
    }
}
