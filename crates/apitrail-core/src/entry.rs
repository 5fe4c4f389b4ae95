//! Snapshot records: API entries, submodules and versions.
//!
//! Entries are addressed by position inside their submodule. A forward link
//! is the index of the matching entry in the next version's list for the
//! same submodule path, so the entry lists must keep their order.

use crate::stability::StabilityFact;
use crate::text::clean_signature;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

static FUNCTION_NAME: OnceLock<Regex> = OnceLock::new();

fn function_name_pattern() -> &'static Regex {
    FUNCTION_NAME.get_or_init(|| {
        Regex::new(r"fn (?P<name>\w+)[<(]").expect("function name regex must compile")
    })
}

/// How a forward link was established.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Owner and signature are identical.
    Exact,
    /// Same owner and same function name; the signature changed.
    Tolerant,
}

/// Link from an entry to its counterpart in the next version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForwardLink {
    /// Position in the next version's entry list for the same submodule.
    pub index: usize,
    pub kind: LinkKind,
}

impl ForwardLink {
    pub fn exact(index: usize) -> Self {
        ForwardLink {
            index,
            kind: LinkKind::Exact,
        }
    }

    pub fn tolerant(index: usize) -> Self {
        ForwardLink {
            index,
            kind: LinkKind::Tolerant,
        }
    }
}

/// Coarse shape of an entry, derived from its signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCategory {
    Function,
    Impl,
    AssociatedType,
    Other,
}

/// Structural category of a submodule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmoduleKind {
    Module,
    Struct,
    Enum,
    Union,
    Trait,
    Function,
    Type,
    Macro,
    Constant,
    Primitive,
    Keyword,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One API surface item of a submodule at one version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEntry {
    /// Path of the owning submodule.
    pub submodule_path: String,

    /// Document section the entry was listed under ("Methods", "Implementors", ...).
    #[serde(default)]
    pub group_label: String,

    /// Signature of the enclosing impl block or container.
    #[serde(default)]
    pub owner_signature: String,

    pub signature: String,

    /// Raw stability annotations, exactly as extracted from the document.
    #[serde(default)]
    pub annotations: Vec<String>,

    /// Facts decoded from `annotations`, in document order.
    #[serde(default)]
    pub stability: Vec<StabilityFact>,

    /// Counterpart in the next version. `None` means unmatched.
    #[serde(default)]
    pub forward_link: Option<ForwardLink>,

    /// Consecutive prior versions this entry's surface has existed for.
    #[serde(default)]
    pub duration: u32,

    /// Whether an entry of the previous version links here.
    #[serde(default)]
    pub has_predecessor: bool,
}

impl ApiEntry {
    /// Create an entry. Owner and signature text is cleaned.
    pub fn new(
        submodule_path: impl Into<String>,
        group_label: impl Into<String>,
        owner_signature: &str,
        signature: &str,
    ) -> Self {
        ApiEntry {
            submodule_path: submodule_path.into(),
            group_label: group_label.into(),
            owner_signature: clean_signature(owner_signature),
            signature: clean_signature(signature),
            annotations: Vec::new(),
            stability: Vec::new(),
            forward_link: None,
            duration: 0,
            has_predecessor: false,
        }
    }

    /// Add a raw stability annotation.
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Add an already decoded stability fact.
    pub fn with_fact(mut self, fact: StabilityFact) -> Self {
        self.stability.push(fact);
        self
    }

    pub fn is_unstable(&self) -> bool {
        self.stability.iter().any(StabilityFact::is_unstable)
    }

    pub fn is_deprecated(&self) -> bool {
        self.stability.iter().any(StabilityFact::is_deprecated)
    }

    /// Non-empty feature flags of the unstable facts.
    pub fn feature_flags(&self) -> impl Iterator<Item = &str> {
        self.stability
            .iter()
            .filter(|fact| fact.is_unstable() && !fact.feature_flag.is_empty())
            .map(|fact| fact.feature_flag.as_str())
    }

    /// Whether an unstable flag of `self` is also a flag of `other`.
    pub fn shares_feature_flag(&self, other: &ApiEntry) -> bool {
        self.feature_flags().any(|flag| {
            other
                .stability
                .iter()
                .any(|fact| !fact.feature_flag.is_empty() && fact.feature_flag == flag)
        })
    }

    /// Owner and signature are identical.
    pub fn same_surface(&self, other: &ApiEntry) -> bool {
        self.owner_signature == other.owner_signature && self.signature == other.signature
    }

    /// Identifier following the first `fn ` in the signature, up to the
    /// generic or parameter list.
    pub fn function_name(&self) -> Option<&str> {
        function_name_pattern()
            .captures(&self.signature)
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str())
    }

    pub fn category(&self) -> EntryCategory {
        if self.signature.contains("fn ") {
            EntryCategory::Function
        } else if self.signature.len() > "impl".len() && self.signature.starts_with("impl") {
            EntryCategory::Impl
        } else if self.signature.len() > "type ".len() && self.signature.starts_with("type ") {
            EntryCategory::AssociatedType
        } else {
            EntryCategory::Other
        }
    }

    /// No entry of the previous version links here.
    ///
    /// When every link extends duration this is the same as `duration == 0`.
    pub fn is_first_appearance(&self) -> bool {
        !self.has_predecessor
    }

    pub fn is_linked(&self) -> bool {
        self.forward_link.is_some()
    }
}

/// One submodule at one version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleSnapshot {
    #[serde(default)]
    pub kind: SubmoduleKind,

    pub path: String,

    /// Declaration of the submodule itself (`pub struct Foo<T>`, ...).
    #[serde(default)]
    pub container_signature: String,

    #[serde(default)]
    pub annotations: Vec<String>,

    #[serde(default)]
    pub stability: Vec<StabilityFact>,

    #[serde(default)]
    pub entries: Vec<ApiEntry>,
}

impl SubmoduleSnapshot {
    pub fn new(kind: SubmoduleKind, path: impl Into<String>) -> Self {
        SubmoduleSnapshot {
            kind,
            path: path.into(),
            container_signature: String::new(),
            annotations: Vec::new(),
            stability: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn with_container_signature(mut self, signature: &str) -> Self {
        self.container_signature = clean_signature(signature);
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Append an entry. Its submodule path is set to this submodule's path.
    pub fn with_entry(mut self, mut entry: ApiEntry) -> Self {
        entry.submodule_path = self.path.clone();
        self.entries.push(entry);
        self
    }

    pub fn with_entries(self, entries: impl IntoIterator<Item = ApiEntry>) -> Self {
        entries
            .into_iter()
            .fold(self, |submodule, entry| submodule.with_entry(entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unstable_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_unstable()).count()
    }
}

/// All submodules of one version, keyed by path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub label: String,

    #[serde(default)]
    pub submodules: HashMap<String, SubmoduleSnapshot>,
}

impl VersionSnapshot {
    pub fn new(label: impl Into<String>) -> Self {
        VersionSnapshot {
            label: label.into(),
            submodules: HashMap::new(),
        }
    }

    /// Insert a submodule, replacing any previous one at the same path.
    pub fn insert(&mut self, submodule: SubmoduleSnapshot) -> Option<SubmoduleSnapshot> {
        self.submodules.insert(submodule.path.clone(), submodule)
    }

    pub fn with_submodule(mut self, submodule: SubmoduleSnapshot) -> Self {
        self.insert(submodule);
        self
    }

    pub fn get(&self, path: &str) -> Option<&SubmoduleSnapshot> {
        self.submodules.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut SubmoduleSnapshot> {
        self.submodules.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.submodules.contains_key(path)
    }

    /// Submodule paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.submodules.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn submodule_count(&self) -> usize {
        self.submodules.len()
    }

    pub fn entry_count(&self) -> usize {
        self.submodules.values().map(SubmoduleSnapshot::len).sum()
    }

    pub fn unstable_entry_count(&self) -> usize {
        self.submodules
            .values()
            .map(SubmoduleSnapshot::unstable_count)
            .sum()
    }

    /// Entry at `index` of the submodule at `path`.
    pub fn entry(&self, path: &str, index: usize) -> Option<&ApiEntry> {
        self.get(path).and_then(|s| s.entries.get(index))
    }
}
