use std::collections::BTreeMap;

use serde::Deserialize;

use crate::disposition::DispositionPolicy;
use crate::error::ReconError;
use crate::model::SourceKind;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub policy: DispositionPolicy,
    /// BTreeMap so source load/concatenation order is deterministic.
    pub sources: BTreeMap<String, SourceConfig>,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub file: String,
    pub columns: ColumnMapping,
}

/// Maps a source file's own headers onto the canonical fields. The feeds
/// this replaces used wildly different layouts ("Total Hrs (C+D)",
/// "TOTAL_DRILL", "SN", ...), so every source carries its own mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub job_id: String,
    pub hours: String,
    pub drill: String,
    pub serial: String,
    /// Required for field-usage sources; informational elsewhere.
    #[serde(default)]
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ToleranceConfig {
    /// Hours tolerance. Also reused verbatim for drill-distance comparisons
    /// (historical behavior, see matcher).
    #[serde(default = "default_hours_tolerance")]
    pub hours: f64,
    /// How many trailing serial digits form the secondary match key.
    #[serde(default = "default_suffix_digits")]
    pub serial_suffix_digits: usize,
}

fn default_hours_tolerance() -> f64 {
    5.0
}

fn default_suffix_digits() -> usize {
    3
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            hours: default_hours_tolerance(),
            serial_suffix_digits: default_suffix_digits(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.sources.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least 1 source is required".into(),
            ));
        }

        // Candidate rows cannot be assigned a reference pool without a
        // category; insist on the mapping up front.
        for (name, source) in &self.sources {
            if source.kind == SourceKind::FieldUsage && source.columns.category.is_none() {
                return Err(ReconError::ConfigValidation(format!(
                    "field-usage source '{name}' must map a category column"
                )));
            }
        }

        if self.tolerance.hours < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.hours must be non-negative, got {}",
                self.tolerance.hours
            )));
        }
        if self.tolerance.serial_suffix_digits == 0 {
            return Err(ReconError::ConfigValidation(
                "tolerance.serial_suffix_digits must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
