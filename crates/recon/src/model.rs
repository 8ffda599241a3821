use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which role a source feed plays in the reconciliation.
///
/// Reference feeds are ground truth and are never judged duplicates
/// themselves; field-usage feeds are the candidates checked against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    DirectionalReference,
    RentalReference,
    FieldUsage,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectionalReference => write!(f, "directional_reference"),
            Self::RentalReference => write!(f, "rental_reference"),
            Self::FieldUsage => write!(f, "field_usage"),
        }
    }
}

/// Directional vs Rental job classification. Drives which reference pool a
/// candidate row is checked against and which disposition applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    Directional,
    Rental,
}

impl std::fmt::Display for JobCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directional => write!(f, "Directional"),
            Self::Rental => write!(f, "Rental"),
        }
    }
}

/// A single normalized row from any source's CSV.
///
/// `category` is informational on reference rows — a reference feed's role
/// is fixed by `kind` regardless of what category a row happens to carry.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub source: String,
    pub kind: SourceKind,
    pub category: Option<JobCategory>,
    pub job_id: String,
    pub total_hours: Option<f64>,
    pub total_drill: Option<f64>,
    pub serial: String,
    pub raw_fields: HashMap<String, String>,
}

/// Pre-loaded records in output order (source concatenation order).
pub struct ReconInput {
    pub records: Vec<RunRecord>,
}

// ---------------------------------------------------------------------------
// Verdicts + decisions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NotChecked,
    Duplicate,
    AggregateDuplicate,
}

impl Verdict {
    pub fn is_duplicate(self) -> bool {
        !matches!(self, Self::NotChecked)
    }
}

/// Per-row outcome, in input order. `kept == false` means the collaborator
/// layer drops the row from the final output; `flagged == true` means keep
/// it but mark it for manual review.
#[derive(Debug, Clone, Serialize)]
pub struct RowDecision {
    pub row: usize,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<JobCategory>,
    pub verdict: Verdict,
    pub kept: bool,
    pub flagged: bool,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_input: usize,
    pub filtered_empty: usize,
    pub directional_duplicates: usize,
    pub rental_duplicates: usize,
    pub duplicates_removed: usize,
    pub duplicates_flagged: usize,
    pub final_count: usize,
    pub source_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub policy: crate::disposition::DispositionPolicy,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<RowDecision>,
}
