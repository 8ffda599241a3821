use std::collections::HashMap;

use crate::model::{JobCategory, ReconSummary, RowDecision, Verdict};

/// Compute summary statistics from the per-row decisions.
pub fn compute_summary(rows: &[RowDecision]) -> ReconSummary {
    let mut source_counts: HashMap<String, usize> = HashMap::new();
    let mut filtered_empty = 0;
    let mut directional_duplicates = 0;
    let mut rental_duplicates = 0;
    let mut duplicates_removed = 0;
    let mut duplicates_flagged = 0;
    let mut final_count = 0;

    for row in rows {
        *source_counts.entry(row.source.clone()).or_insert(0) += 1;

        if row.kept {
            final_count += 1;
        } else if !row.verdict.is_duplicate() {
            // Dropped without a verdict: the empty-run pre-filter.
            filtered_empty += 1;
        }

        if row.verdict.is_duplicate() {
            match row.category {
                Some(JobCategory::Directional) => directional_duplicates += 1,
                Some(JobCategory::Rental) => rental_duplicates += 1,
                None => {}
            }
            if !row.kept {
                duplicates_removed += 1;
            }
            if row.flagged {
                duplicates_flagged += 1;
            }
        }
    }

    ReconSummary {
        total_input: rows.len(),
        filtered_empty,
        directional_duplicates,
        rental_duplicates,
        duplicates_removed,
        duplicates_flagged,
        final_count,
        source_counts,
    }
}
