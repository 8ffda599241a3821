use crate::model::{RunRecord, SourceKind};

/// Disjoint views over the record set, as indices into it.
///
/// Pool membership is decided by the source's kind alone — a reference row
/// carrying an odd category value is still reference material for its
/// feed's fixed role.
#[derive(Debug, Default)]
pub struct Pools {
    pub directional_reference: Vec<usize>,
    pub rental_reference: Vec<usize>,
    pub candidates: Vec<usize>,
}

/// Split records into reference pools and candidates, skipping rows the
/// driver has already filtered out. Index order follows input order.
pub fn partition(records: &[RunRecord], skip: &[bool]) -> Pools {
    let mut pools = Pools::default();

    for (idx, record) in records.iter().enumerate() {
        if skip.get(idx).copied().unwrap_or(false) {
            continue;
        }
        match record.kind {
            SourceKind::DirectionalReference => pools.directional_reference.push(idx),
            SourceKind::RentalReference => pools.rental_reference.push(idx),
            SourceKind::FieldUsage => pools.candidates.push(idx),
        }
    }

    pools
}
