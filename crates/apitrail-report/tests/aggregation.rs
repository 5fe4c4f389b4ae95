//! Aggregation over bound and classified stores.
//!
//! These tests verify:
//!  - Row totals agree with the version entry counts
//!  - Splitting a range and recombining gives the same totals
//!  - Duration subsets are consistent with the evolution table

use apitrail_binding::Binder;
use apitrail_core::{
    ApiEntry, SnapshotStore, StabilityFact, SubmoduleKind, SubmoduleSnapshot, Tally,
    VersionSnapshot,
};
use apitrail_lifecycle::Classifier;
use apitrail_report::{DurationReport, EvolutionReport, VersionObservation};
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn entry_strategy() -> impl Strategy<Value = ApiEntry> {
    let name = prop::sample::select(vec!["get", "set", "len", "push"]);
    let params = prop::sample::select(vec!["", "x: u8"]);
    let unstable = any::<bool>();
    (name, params, unstable).prop_map(|(name, params, unstable)| {
        let e = ApiEntry::new("m", "Methods", "impl Foo", &format!("fn {}({})", name, params));
        if unstable {
            e.with_fact(StabilityFact::unstable("f", "Unstable (f)"))
        } else {
            e
        }
    })
}

fn store_strategy() -> impl Strategy<Value = SnapshotStore> {
    prop::collection::vec(prop::collection::vec(entry_strategy(), 0..6), 2..7).prop_map(|versions| {
        let mut store = SnapshotStore::from_versions(versions.into_iter().enumerate().map(|(i, entries)| {
            VersionSnapshot::new(format!("1.{}.0", i))
                .with_submodule(SubmoduleSnapshot::new(SubmoduleKind::Struct, "m").with_entries(entries))
        }));
        Binder::new().bind_store(&mut store);
        store
    })
}

fn evolution(store: &SnapshotStore, start: usize, end: usize) -> EvolutionReport {
    let classifier = Classifier::new();
    let versions = store.versions();
    (start..=end)
        .map(|index| {
            let transition = (index > start)
                .then(|| classifier.classify_pair(&versions[index - 1], &versions[index]));
            VersionObservation::observe(&versions[index], transition)
        })
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn rows_balance_against_entry_counts(store in store_strategy()) {
        let report = evolution(&store, 0, store.len() - 1);
        let rows = report.rows();

        for index in 1..rows.len() {
            let row = &rows[index];
            prop_assert_eq!(row.same + row.modified + row.removed, rows[index - 1].api_count);
            prop_assert!(row.same + row.modified + row.new >= row.api_count);
        }
    }

    #[test]
    fn split_ranges_recombine(store in store_strategy(), split in 0usize..6) {
        let last = store.len() - 1;
        let split = split.min(last);

        let whole = evolution(&store, 0, last);
        let left = evolution(&store, 0, split);
        let right = evolution(&store, split, last);

        prop_assert_eq!(left.totals().combine(right.totals()), whole.totals().clone());
        prop_assert_eq!(left.len() + right.len(), whole.len() + 1);
    }

    #[test]
    fn removed_durations_match_removed_counts(store in store_strategy()) {
        let report = evolution(&store, 0, store.len() - 1);
        let durations = DurationReport::from_store(&store);

        for index in 0..store.len() - 1 {
            let removed_next = report.rows()[index + 1].removed;
            let subsets = &durations.versions()[index].subsets;
            prop_assert_eq!(subsets.removed.summary().total, removed_next);
            prop_assert_eq!(
                subsets.unstable_removed.summary().total,
                report.rows()[index + 1].unstable.removed
            );
        }
        let final_version = &durations.versions()[store.len() - 1].subsets;
        prop_assert!(final_version.removed.is_empty_tally());
    }
}

#[test]
fn test_report_serializes_to_json() {
    let store = SnapshotStore::from_versions([VersionSnapshot::new("1.0.0")]);
    let report = evolution(&store, 0, 0);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["rows"][0]["version"], "1.0.0");

    let durations = serde_json::to_value(DurationReport::from_store(&store)).unwrap();
    assert_eq!(durations["versions"][0]["version"], "1.0.0");
}
