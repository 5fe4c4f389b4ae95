//! The ordered sequence of version snapshots.

use crate::entry::VersionSnapshot;
use crate::error::{Result, StoreError};
use crate::stability::{Normalizer, StabilityDiagnostic};
use serde::{Deserialize, Serialize};

/// Version snapshots in increasing version order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotStore {
    versions: Vec<VersionSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore {
            versions: Vec::new(),
        }
    }

    pub fn from_versions(versions: impl IntoIterator<Item = VersionSnapshot>) -> Self {
        SnapshotStore {
            versions: versions.into_iter().collect(),
        }
    }

    /// Load a store from its JSON encoding.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Append the next version.
    pub fn push(&mut self, version: VersionSnapshot) {
        self.versions.push(version);
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn version(&self, index: usize) -> Option<&VersionSnapshot> {
        self.versions.get(index)
    }

    /// Like [`version`](Self::version), failing with `IndexOutOfBounds`.
    pub fn require(&self, index: usize) -> Result<&VersionSnapshot> {
        self.versions.get(index).ok_or(StoreError::IndexOutOfBounds {
            index,
            length: self.versions.len(),
        })
    }

    pub fn version_mut(&mut self, index: usize) -> Option<&mut VersionSnapshot> {
        self.versions.get_mut(index)
    }

    pub fn versions(&self) -> &[VersionSnapshot] {
        &self.versions
    }

    /// Index of the version with `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.versions.iter().position(|v| v.label == label)
    }

    /// Version `index` and its successor, both mutable.
    pub fn pair_mut(&mut self, index: usize) -> Option<(&mut VersionSnapshot, &mut VersionSnapshot)> {
        if index + 1 >= self.versions.len() {
            return None;
        }
        let (head, tail) = self.versions.split_at_mut(index + 1);
        Some((&mut head[index], &mut tail[0]))
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if self.versions.is_empty() {
            return Err(StoreError::Empty);
        }
        if start > end || end >= self.versions.len() {
            return Err(StoreError::InvalidRange {
                start,
                end,
                length: self.versions.len(),
            });
        }
        Ok(())
    }

    /// Copy of versions `start..=end`.
    pub fn select_range(&self, start: usize, end: usize) -> Result<SnapshotStore> {
        self.check_range(start, end)?;
        Ok(SnapshotStore {
            versions: self.versions[start..=end].to_vec(),
        })
    }

    /// Keep only versions `start..=end`.
    pub fn retain_range(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;
        self.versions.truncate(end + 1);
        self.versions.drain(..start);
        Ok(())
    }

    /// Clear forward links, durations and predecessor marks.
    pub fn reset_bindings(&mut self) {
        for version in &mut self.versions {
            for submodule in version.submodules.values_mut() {
                for entry in &mut submodule.entries {
                    entry.forward_link = None;
                    entry.duration = 0;
                    entry.has_predecessor = false;
                }
            }
        }
    }

    /// Decode every raw annotation in the store.
    ///
    /// Previously decoded facts are replaced. Diagnostics are returned in
    /// version order, then by submodule path, then by signature.
    pub fn normalize_stability(&mut self, normalizer: &Normalizer) -> Vec<StabilityDiagnostic> {
        let mut diagnostics = Vec::new();

        for (version_index, version) in self.versions.iter_mut().enumerate() {
            for submodule in version.submodules.values_mut() {
                let outcome = normalizer.normalize(&submodule.annotations);
                submodule.stability = outcome.facts;
                if let Some(reason) = outcome.unhandled {
                    diagnostics.push(StabilityDiagnostic {
                        version_index,
                        version: version.label.clone(),
                        submodule_path: submodule.path.clone(),
                        signature: None,
                        annotations: submodule.annotations.clone(),
                        reason,
                    });
                }

                for entry in &mut submodule.entries {
                    let outcome = normalizer.normalize(&entry.annotations);
                    entry.stability = outcome.facts;
                    if let Some(reason) = outcome.unhandled {
                        diagnostics.push(StabilityDiagnostic {
                            version_index,
                            version: version.label.clone(),
                            submodule_path: submodule.path.clone(),
                            signature: Some(entry.signature.clone()),
                            annotations: entry.annotations.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        diagnostics.sort_by(|a, b| {
            (a.version_index, &a.submodule_path, &a.signature)
                .cmp(&(b.version_index, &b.submodule_path, &b.signature))
        });
        for diagnostic in &diagnostics {
            tracing::warn!(
                version = %diagnostic.version,
                submodule = %diagnostic.submodule_path,
                signature = ?diagnostic.signature,
                reason = %diagnostic.reason,
                "Unhandled stability annotation"
            );
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ApiEntry, SubmoduleKind, SubmoduleSnapshot};

    fn store_of(labels: &[&str]) -> SnapshotStore {
        SnapshotStore::from_versions(labels.iter().map(|l| VersionSnapshot::new(*l)))
    }

    #[test]
    fn test_pair_mut() {
        let mut store = store_of(&["1.0.0", "1.1.0"]);
        let (old, new) = store.pair_mut(0).unwrap();
        assert_eq!(old.label, "1.0.0");
        assert_eq!(new.label, "1.1.0");
        assert!(store.pair_mut(1).is_none());
    }

    #[test]
    fn test_require() {
        let store = store_of(&["1.0.0"]);
        assert_eq!(store.require(0).map(|v| v.label.as_str()), Ok("1.0.0"));
        assert_eq!(
            store.require(3),
            Err(StoreError::IndexOutOfBounds {
                index: 3,
                length: 1
            })
        );
    }

    #[test]
    fn test_select_range() {
        let store = store_of(&["a", "b", "c", "d"]);
        let slice = store.select_range(1, 2).unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.versions()[0].label, "b");
        assert_eq!(
            store.select_range(2, 1),
            Err(StoreError::InvalidRange {
                start: 2,
                end: 1,
                length: 4
            })
        );
        assert!(store.select_range(0, 4).is_err());
        assert_eq!(SnapshotStore::new().select_range(0, 0), Err(StoreError::Empty));
    }

    #[test]
    fn test_retain_range() {
        let mut store = store_of(&["a", "b", "c", "d"]);
        store.retain_range(1, 2).unwrap();
        assert_eq!(store.position("b"), Some(0));
        assert_eq!(store.position("c"), Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_normalize_stability_reports_and_keeps_raw_text() {
        let mut store = SnapshotStore::from_versions([VersionSnapshot::new("1.0.0").with_submodule(
            SubmoduleSnapshot::new(SubmoduleKind::Struct, "std::foo::Foo").with_entries([
                ApiEntry::new("", "Methods", "impl Foo", "fn a()")
                    .with_annotation("Unstable (foo_a #1)"),
                ApiEntry::new("", "Methods", "impl Foo", "fn b()")
                    .with_annotation("Something odd"),
            ]),
        )]);

        let diagnostics = store.normalize_stability(&Normalizer::new());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].signature.as_deref(), Some("fn b()"));

        let entries = &store.versions()[0].get("std::foo::Foo").unwrap().entries;
        assert!(entries[0].is_unstable());
        assert_eq!(entries[1].annotations, vec!["Something odd".to_string()]);
        assert!(entries[1].stability.is_empty());
    }

    #[test]
    fn test_reset_bindings() {
        let mut bound = ApiEntry::new("", "Methods", "impl Foo", "fn a()");
        bound.forward_link = Some(crate::entry::ForwardLink::exact(0));
        bound.duration = 3;
        bound.has_predecessor = true;
        let mut store = SnapshotStore::from_versions([VersionSnapshot::new("1.0.0")
            .with_submodule(SubmoduleSnapshot::new(SubmoduleKind::Struct, "m").with_entry(bound))]);

        store.reset_bindings();

        let entry = store.versions()[0].entry("m", 0).unwrap();
        assert!(!entry.is_linked());
        assert_eq!(entry.duration, 0);
        assert!(entry.is_first_appearance());
    }

    #[test]
    fn test_json_round_trip() {
        let store = SnapshotStore::from_versions([VersionSnapshot::new("1.0.0").with_submodule(
            SubmoduleSnapshot::new(SubmoduleKind::Trait, "core::iter::Iterator")
                .with_entry(ApiEntry::new("", "Required Methods", "", "fn next(&mut self) -> Option<Self::Item>")),
        )]);
        let json = store.to_json_string().unwrap();
        assert_eq!(SnapshotStore::from_json_str(&json).unwrap(), store);
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"[{"label":"1.0.0","submodules":{"a":{"path":"a","entries":[
            {"submodule_path":"a","signature":"fn x()"}]}}}]"#;
        let store = SnapshotStore::from_json_str(json).unwrap();
        let entry = store.versions()[0].entry("a", 0).unwrap();
        assert_eq!(entry.forward_link, None);
        assert_eq!(entry.duration, 0);
        assert_eq!(store.versions()[0].get("a").unwrap().kind, SubmoduleKind::Unknown);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            SnapshotStore::from_json_str("{"),
            Err(StoreError::SerializationError(_))
        ));
    }
}
