//! Stability annotation normalization.
//!
//! Raw annotations ("This is a nightly-only experimental API", "Deprecated
//! since 1.8.0: ...") are decoded into [`StabilityFact`]s by an ordered list
//! of [`StabilityRule`]s. Each rule pairs a pattern with an extractor; the
//! first rule that matches a span of text consumes it, so later rules never
//! see that span again.
//!
//! Decoding problems are never fatal. They come back as an
//! [`UnhandledReason`] next to whatever facts could be recovered, and the
//! caller keeps the raw annotation text.

use crate::text::clean_text;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;
use thiserror::Error;

/// Portability notes are rendered in the same slot as stability notes but
/// carry no stability information.
const PORTABILITY_MARKER: &str = "This is supported on";

/// Kind of stability marking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityStatus {
    /// Feature-gated, only usable on nightly behind `feature_flag`.
    Unstable,
    /// Deprecated since `since_version`.
    Deprecated,
}

/// A single decoded stability marking.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StabilityFact {
    pub status: StabilityStatus,

    /// Feature gate name. Non-empty for well-formed unstable facts.
    #[serde(default)]
    pub feature_flag: String,

    /// Version the deprecation took effect in.
    #[serde(default)]
    pub since_version: String,

    /// The annotation text this fact was decoded from.
    #[serde(default)]
    pub raw_text: String,
}

impl StabilityFact {
    pub fn unstable(feature_flag: impl Into<String>, raw_text: impl Into<String>) -> Self {
        StabilityFact {
            status: StabilityStatus::Unstable,
            feature_flag: feature_flag.into(),
            since_version: String::new(),
            raw_text: raw_text.into(),
        }
    }

    pub fn deprecated(since_version: impl Into<String>, raw_text: impl Into<String>) -> Self {
        StabilityFact {
            status: StabilityStatus::Deprecated,
            feature_flag: String::new(),
            since_version: since_version.into(),
            raw_text: raw_text.into(),
        }
    }

    pub fn is_unstable(&self) -> bool {
        self.status == StabilityStatus::Unstable
    }

    pub fn is_deprecated(&self) -> bool {
        self.status == StabilityStatus::Deprecated
    }
}

/// Why a set of annotations could not be fully decoded.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnhandledReason {
    #[error("decoded {facts} facts from {annotations} annotations")]
    CountMismatch { annotations: usize, facts: usize },

    #[error("unstable marking without a feature flag")]
    MissingFeatureFlag,
}

/// An unhandled annotation set, located in the snapshot store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityDiagnostic {
    /// Position of the version in the store.
    pub version_index: usize,

    /// Label of the version.
    pub version: String,

    pub submodule_path: String,

    /// Signature of the entry, or `None` for the submodule header itself.
    pub signature: Option<String>,

    /// The raw annotations, preserved as-is.
    pub annotations: Vec<String>,

    pub reason: UnhandledReason,
}

/// Result of normalizing one annotation list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Facts in document order.
    pub facts: Vec<StabilityFact>,
    pub unhandled: Option<UnhandledReason>,
}

/// Builds a fact from a match. `caps[0]` is the consumed text.
pub type FactExtractor = fn(&Captures<'_>) -> StabilityFact;

/// One recognized annotation shape.
#[derive(Clone, Debug)]
pub struct StabilityRule {
    name: String,
    pattern: Regex,
    extract: FactExtractor,
}

impl StabilityRule {
    /// Compile a rule.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        extract: FactExtractor,
    ) -> Result<Self, regex::Error> {
        Ok(StabilityRule {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            extract,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn extract_unstable(caps: &Captures<'_>) -> StabilityFact {
    let flag = caps.name("flag").map(|m| m.as_str()).unwrap_or_default();
    StabilityFact::unstable(flag, &caps[0])
}

fn extract_deprecated(caps: &Captures<'_>) -> StabilityFact {
    let since = caps.name("since").map(|m| m.as_str()).unwrap_or_default();
    StabilityFact::deprecated(since, &caps[0])
}

static DEFAULT_RULES: OnceLock<Vec<StabilityRule>> = OnceLock::new();

/// The built-in rules, in priority order.
fn default_rules() -> &'static [StabilityRule] {
    DEFAULT_RULES.get_or_init(|| {
        vec![
            StabilityRule::new(
                "nightly_issue",
                r"🔬 This is a nightly-only experimental API\.\s+\((?P<flag>\w+)\s#[0-9]+\)",
                extract_unstable,
            )
            .expect("nightly_issue regex must compile"),
            StabilityRule::new(
                "nightly_flag",
                r"🔬 This is a nightly-only experimental API\.\s\((?P<flag>\w+)\)",
                extract_unstable,
            )
            .expect("nightly_flag regex must compile"),
            StabilityRule::new(
                "unstable_issue",
                r"Unstable \((?P<flag>\w+) #[0-9]+\)",
                extract_unstable,
            )
            .expect("unstable_issue regex must compile"),
            StabilityRule::new("unstable_flag", r"Unstable \((?P<flag>\w+)\)", extract_unstable)
                .expect("unstable_flag regex must compile"),
            StabilityRule::new(
                "deprecated_since",
                r"Deprecated since (?P<since>1\.[0-9]+(?:\.[0-9]+)*)(?::[^\n]*)?",
                extract_deprecated,
            )
            .expect("deprecated_since regex must compile"),
        ]
    })
}

/// Ordered rule set decoding raw annotations into facts.
#[derive(Clone, Debug)]
pub struct Normalizer {
    rules: Vec<StabilityRule>,
}

impl Normalizer {
    /// Create a normalizer with the built-in rules.
    pub fn new() -> Self {
        Normalizer {
            rules: default_rules().to_vec(),
        }
    }

    /// Create a normalizer without any rules.
    pub fn empty() -> Self {
        Normalizer { rules: Vec::new() }
    }

    /// Append a rule with the lowest priority so far.
    pub fn with_rule(mut self, rule: StabilityRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[StabilityRule] {
        &self.rules
    }

    /// Decode one annotation string into facts, in document order.
    pub fn decode(&self, annotation: &str) -> Vec<StabilityFact> {
        let text = clean_text(annotation);
        let mut consumed: Vec<Range<usize>> = Vec::new();
        let mut found: Vec<(usize, StabilityFact)> = Vec::new();

        for rule in &self.rules {
            for caps in rule.pattern.captures_iter(&text) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let span = whole.range();
                if consumed
                    .iter()
                    .any(|taken| taken.start < span.end && span.start < taken.end)
                {
                    continue;
                }
                // A fact's raw text must decode back to the same fact.
                let mut fact = (rule.extract)(&caps);
                fact.raw_text = clean_text(&fact.raw_text);
                found.push((span.start, fact));
                consumed.push(span);
            }
        }

        found.sort_by_key(|(start, _)| *start);
        found.into_iter().map(|(_, fact)| fact).collect()
    }

    /// Decode a full annotation list and check it was fully understood.
    pub fn normalize(&self, annotations: &[String]) -> Normalized {
        let facts: Vec<StabilityFact> = annotations
            .iter()
            .flat_map(|annotation| self.decode(annotation))
            .collect();

        let portability_only =
            annotations.len() == 1 && annotations[0].contains(PORTABILITY_MARKER);

        let unhandled = if facts.len() != annotations.len() && !portability_only {
            Some(UnhandledReason::CountMismatch {
                annotations: annotations.len(),
                facts: facts.len(),
            })
        } else if facts
            .iter()
            .any(|fact| fact.is_unstable() && fact.feature_flag.is_empty())
        {
            Some(UnhandledReason::MissingFeatureFlag)
        } else {
            None
        };

        Normalized { facts, unhandled }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
