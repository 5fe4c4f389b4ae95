//! Analysis configuration.

use crate::error::{AnalysisError, Result};
use apitrail_binding::BindingConfig;
use apitrail_lifecycle::ClassificationConfig;
use serde::{Deserialize, Serialize};

/// Inclusive range of store indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub start: usize,
    pub end: usize,
}

impl VersionRange {
    pub fn new(start: usize, end: usize) -> Self {
        VersionRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Configuration for a full analysis run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub binding: BindingConfig,

    pub classification: ClassificationConfig,

    /// Versions to analyze. `None` analyzes the whole store.
    pub range: Option<VersionRange>,
}

impl AnalysisConfig {
    /// Parse a configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.range = Some(VersionRange::new(start, end));
        self
    }

    pub fn with_binding(mut self, binding: BindingConfig) -> Self {
        self.binding = binding;
        self
    }

    pub fn with_classification(mut self, classification: ClassificationConfig) -> Self {
        self.classification = classification;
        self
    }

    /// Checks that do not depend on the store.
    pub fn validate(&self) -> Result<()> {
        if let Some(range) = self.range {
            if range.is_empty() {
                return Err(AnalysisError::InvalidConfig(format!(
                    "range start {} is after end {}",
                    range.start, range.end
                )));
            }
        }
        Ok(())
    }
}
