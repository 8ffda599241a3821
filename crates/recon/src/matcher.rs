use crate::config::ToleranceConfig;
use crate::normalize::MatchKey;

/// How a candidate was judged a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The candidate's total accounts for several reference runs combined
    /// (same job + serial suffix, totals summed).
    Aggregate,
    /// The candidate matches a single reference run.
    Pairwise,
}

/// Decide whether `candidate` re-states one or more rows of `pool`.
///
/// Two strategies, tried in order; either success is sufficient.
/// Hours are the primary axis; drill distance substitutes only where the
/// hours side is zero/absent. The drill comparison reuses the hours
/// tolerance constant — a known quirk carried from production behavior,
/// left as-is until validated against real data.
pub fn evaluate(
    candidate: &MatchKey,
    pool: &[MatchKey],
    tolerance: &ToleranceConfig,
) -> Option<MatchKind> {
    // No identifying key, no match possible.
    if candidate.job_id.is_empty() {
        return None;
    }

    let matching_jobs: Vec<&MatchKey> =
        pool.iter().filter(|r| r.job_id == candidate.job_id).collect();
    if matching_jobs.is_empty() {
        return None;
    }

    // Strategy A: the candidate may represent multiple reference runs
    // combined. Only rows sharing the candidate's serial suffix count.
    if !candidate.serial_suffix.is_empty() {
        let suffix_rows: Vec<&&MatchKey> = matching_jobs
            .iter()
            .filter(|r| r.serial_suffix == candidate.serial_suffix)
            .collect();

        if !suffix_rows.is_empty() {
            let sum_hours: f64 = suffix_rows.iter().map(|r| r.hours).sum();
            if candidate.hours > 0.0 && sum_hours > 0.0 {
                if (candidate.hours - sum_hours).abs() <= tolerance.hours {
                    return Some(MatchKind::Aggregate);
                }
                // Out of tolerance on hours: no drill fallback here,
                // fall through to the pairwise pass.
            } else {
                let sum_drill: f64 = suffix_rows.iter().map(|r| r.drill).sum();
                if candidate.drill > 0.0
                    && sum_drill > 0.0
                    && (candidate.drill - sum_drill).abs() <= tolerance.hours
                {
                    return Some(MatchKind::Aggregate);
                }
            }
        }
    }

    // Strategy B: pairwise against every job-matched row; first hit wins.
    for reference in &matching_jobs {
        let hrs_match = if candidate.hours > 0.0 || reference.hours > 0.0 {
            (candidate.hours - reference.hours).abs() <= tolerance.hours
        } else if candidate.drill > 0.0 || reference.drill > 0.0 {
            (candidate.drill - reference.drill).abs() <= tolerance.hours
        } else {
            false
        };

        // Suffixes match when equal and present, or when both are absent.
        // One-sided absence is a mismatch.
        let sn_match = if !candidate.serial_suffix.is_empty()
            && !reference.serial_suffix.is_empty()
        {
            candidate.serial_suffix == reference.serial_suffix
        } else {
            candidate.serial_suffix.is_empty() && reference.serial_suffix.is_empty()
        };

        if hrs_match && sn_match {
            return Some(MatchKind::Pairwise);
        }
    }

    None
}
