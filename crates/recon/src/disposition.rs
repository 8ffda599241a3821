use serde::{Deserialize, Serialize};

use crate::model::{JobCategory, Verdict};

/// What to do with duplicate verdicts. One engine, two historical output
/// modes — the detection logic is identical, only the consequence differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispositionPolicy {
    /// Directional duplicates are dropped from the output; Rental
    /// duplicates are kept and flagged for manual review.
    RemoveDirectional,
    /// Every duplicate is kept and flagged; nothing is dropped by verdict.
    HighlightAll,
}

impl Default for DispositionPolicy {
    fn default() -> Self {
        Self::RemoveDirectional
    }
}

impl std::fmt::Display for DispositionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoveDirectional => write!(f, "remove_directional"),
            Self::HighlightAll => write!(f, "highlight_all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disposition {
    pub kept: bool,
    pub flagged: bool,
}

/// Map (category, verdict) to an output action. Directional restatements
/// are noise to discard; Rental restatements need a human decision, so
/// they survive with a marker.
pub fn decide(
    policy: DispositionPolicy,
    category: Option<JobCategory>,
    verdict: Verdict,
) -> Disposition {
    if !verdict.is_duplicate() {
        return Disposition { kept: true, flagged: false };
    }

    match (policy, category) {
        (DispositionPolicy::RemoveDirectional, Some(JobCategory::Directional)) => {
            Disposition { kept: false, flagged: false }
        }
        _ => Disposition { kept: true, flagged: true },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_duplicate_is_removed() {
        let d = decide(
            DispositionPolicy::RemoveDirectional,
            Some(JobCategory::Directional),
            Verdict::Duplicate,
        );
        assert!(!d.kept);
        assert!(!d.flagged);
    }

    #[test]
    fn rental_duplicate_is_kept_and_flagged() {
        let d = decide(
            DispositionPolicy::RemoveDirectional,
            Some(JobCategory::Rental),
            Verdict::AggregateDuplicate,
        );
        assert!(d.kept);
        assert!(d.flagged);
    }

    #[test]
    fn not_checked_passes_through_unflagged() {
        let d = decide(
            DispositionPolicy::RemoveDirectional,
            Some(JobCategory::Directional),
            Verdict::NotChecked,
        );
        assert!(d.kept);
        assert!(!d.flagged);
    }

    #[test]
    fn highlight_all_keeps_directional_duplicates() {
        let d = decide(
            DispositionPolicy::HighlightAll,
            Some(JobCategory::Directional),
            Verdict::Duplicate,
        );
        assert!(d.kept);
        assert!(d.flagged);
    }
}
