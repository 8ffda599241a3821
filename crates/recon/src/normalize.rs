use crate::model::RunRecord;

/// The comparison key the evaluator works on. Absent hours/drill compare
/// as zero; whether a value was absent only matters through the zero
/// checks in the evaluator's fallback rules.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchKey {
    pub job_id: String,
    pub hours: f64,
    pub drill: f64,
    pub serial_suffix: String,
}

/// Extract the comparison key fields from a record. Pure, no state.
pub fn normalize(record: &RunRecord, suffix_digits: usize) -> MatchKey {
    MatchKey {
        job_id: record.job_id.clone(),
        hours: record.total_hours.unwrap_or(0.0),
        drill: record.total_drill.unwrap_or(0.0),
        serial_suffix: serial_suffix(&record.serial, suffix_digits),
    }
}

/// Last `digits` decimal digits of a free-form serial identifier.
///
/// Non-digit characters are discarded first; if fewer digits exist, all of
/// them are returned (possibly the empty string). The result is text, not a
/// number — leading zeros like "007" are preserved.
pub fn serial_suffix(raw: &str, digits: usize) -> String {
    let only_digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if only_digits.len() > digits {
        only_digits[only_digits.len() - digits..].to_string()
    } else {
        only_digits
    }
}
