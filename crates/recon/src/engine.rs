use std::collections::HashMap;

use crate::config::{ReconConfig, SourceConfig};
use crate::disposition;
use crate::error::ReconError;
use crate::matcher::{self, MatchKind};
use crate::model::{
    JobCategory, ReconInput, ReconMeta, ReconResult, RowDecision, RunRecord, SourceKind, Verdict,
};
use crate::normalize::{normalize, MatchKey};
use crate::partition::partition;
use crate::report::compute_summary;

/// Run one reconciliation pass. Returns per-row decisions in input order
/// plus summary counts.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let records = &input.records;

    // Data-quality filter, independent of any duplicate determination:
    // a run with no hours and no drill distance carries no signal.
    let skip: Vec<bool> = records.iter().map(is_empty_run).collect();

    let keys: Vec<MatchKey> = records
        .iter()
        .map(|r| normalize(r, config.tolerance.serial_suffix_digits))
        .collect();

    let pools = partition(records, &skip);
    let directional_pool: Vec<MatchKey> = pools
        .directional_reference
        .iter()
        .map(|&i| keys[i].clone())
        .collect();
    let rental_pool: Vec<MatchKey> = pools
        .rental_reference
        .iter()
        .map(|&i| keys[i].clone())
        .collect();

    // Reference pools are immutable from here on; every candidate verdict
    // depends only on them and the candidate's own fields.
    let mut verdicts = vec![Verdict::NotChecked; records.len()];
    for &idx in &pools.candidates {
        let record = &records[idx];
        let category = record.category.ok_or_else(|| ReconError::MissingCategory {
            source: record.source.clone(),
            row: idx,
        })?;
        let pool = match category {
            JobCategory::Directional => &directional_pool,
            JobCategory::Rental => &rental_pool,
        };
        if let Some(kind) = matcher::evaluate(&keys[idx], pool, &config.tolerance) {
            verdicts[idx] = match kind {
                MatchKind::Aggregate => Verdict::AggregateDuplicate,
                MatchKind::Pairwise => Verdict::Duplicate,
            };
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let (verdict, kept, flagged) = if skip[idx] {
            (Verdict::NotChecked, false, false)
        } else {
            let verdict = verdicts[idx];
            let d = disposition::decide(config.policy, record.category, verdict);
            (verdict, d.kept, d.flagged)
        };
        rows.push(RowDecision {
            row: idx,
            source: record.source.clone(),
            category: record.category,
            verdict,
            kept,
            flagged,
        });
    }

    let summary = compute_summary(&rows);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            policy: config.policy,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        rows,
    })
}

fn is_empty_run(record: &RunRecord) -> bool {
    record.total_hours.unwrap_or(0.0) == 0.0 && record.total_drill.unwrap_or(0.0) == 0.0
}

/// Load CSV rows into RunRecords, applying the source's column mapping.
pub fn load_csv_rows(
    source_name: &str,
    csv_data: &str,
    source_config: &SourceConfig,
) -> Result<Vec<RunRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col = &source_config.columns;

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            ReconError::MissingColumn {
                source: source_name.into(),
                column: name.into(),
            }
        })
    };

    let job_id_idx = idx(&col.job_id)?;
    let hours_idx = idx(&col.hours)?;
    let drill_idx = idx(&col.drill)?;
    let serial_idx = idx(&col.serial)?;
    let category_idx = match &col.category {
        Some(name) => Some(idx(name)?),
        None => None,
    };

    let mut rows = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        // 1-based data row, past the header row.
        let row = i + 2;

        let job_id = record.get(job_id_idx).unwrap_or("").to_string();
        let serial = record.get(serial_idx).unwrap_or("").to_string();
        let total_hours =
            parse_number(record.get(hours_idx).unwrap_or(""), source_name, row, &col.hours)?;
        let total_drill =
            parse_number(record.get(drill_idx).unwrap_or(""), source_name, row, &col.drill)?;

        let raw_category = category_idx.map(|ci| record.get(ci).unwrap_or("")).unwrap_or("");
        let category = match source_config.kind {
            // A candidate without a category cannot be assigned a reference
            // pool; guessing one would corrupt the result.
            SourceKind::FieldUsage => match parse_category(raw_category) {
                Some(c) => Some(c),
                None if raw_category.is_empty() => {
                    return Err(ReconError::MissingCategory {
                        source: source_name.into(),
                        row,
                    });
                }
                None => {
                    return Err(ReconError::CategoryParse {
                        source: source_name.into(),
                        row,
                        value: raw_category.into(),
                    });
                }
            },
            // Reference feeds have a fixed role; their category column is
            // informational and tolerated in any state.
            _ => parse_category(raw_category),
        };

        let mut raw_fields = HashMap::new();
        for (hi, h) in headers.iter().enumerate() {
            if let Some(val) = record.get(hi) {
                raw_fields.insert(h.clone(), val.to_string());
            }
        }

        rows.push(RunRecord {
            source: source_name.into(),
            kind: source_config.kind,
            category,
            job_id,
            total_hours,
            total_drill,
            serial,
            raw_fields,
        });
    }

    Ok(rows)
}

fn parse_number(
    raw: &str,
    source: &str,
    row: usize,
    column: &str,
) -> Result<Option<f64>, ReconError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ReconError::NumberParse {
            source: source.into(),
            row,
            column: column.into(),
            value: raw.into(),
        })
}

fn parse_category(raw: &str) -> Option<JobCategory> {
    match raw {
        "Directional" => Some(JobCategory::Directional),
        "Rental" => Some(JobCategory::Rental),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;

    const CONFIG: &str = r#"
name = "Scorecard clean"

[sources.a_motor_kpi]
kind = "directional_reference"
file = "motor_kpi.csv"

[sources.a_motor_kpi.columns]
job_id = "JOB_NUM"
hours  = "Total Hrs (C+D)"
drill  = "TOTAL_DRILL"
serial = "SN"

[sources.b_cam_tracker]
kind = "rental_reference"
file = "cam_tracker.csv"

[sources.b_cam_tracker.columns]
job_id = "JOB_NUM"
hours  = "Total Hrs (C+D)"
drill  = "TOTAL_DRILL"
serial = "SN"

[sources.c_pog_cam]
kind = "field_usage"
file = "pog_cam.csv"

[sources.c_pog_cam.columns]
job_id   = "JOB_NUM"
hours    = "Total Hrs (C+D)"
drill    = "TOTAL_DRILL"
serial   = "SN"
category = "JOB_TYPE"
"#;

    const MOTOR_KPI_CSV: &str = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN
J1,21,900,MTR-48123
J1,15,400,MTR-48123
J2,50,2000,MTR-55777
";

    const CAM_TRACKER_CSV: &str = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN
J3,14,600,CAM-90123
J3,15,650,CAM-91123
";

    fn load_all(config: &ReconConfig) -> ReconInput {
        let csvs: HashMap<&str, &str> = HashMap::from([
            ("a_motor_kpi", MOTOR_KPI_CSV),
            ("b_cam_tracker", CAM_TRACKER_CSV),
            (
                "c_pog_cam",
                "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN,JOB_TYPE
J1,20,890,X48123,Directional
J3,30,1200,CAM-00123,Rental
J9,40,1500,SN-333,Directional
J2,0,0,MTR-55777,Directional
",
            ),
        ]);

        let mut records = Vec::new();
        for (name, source_config) in &config.sources {
            let rows = load_csv_rows(name, csvs[name.as_str()], source_config).unwrap();
            records.extend(rows);
        }
        ReconInput { records }
    }

    #[test]
    fn load_csv_basic() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let rows =
            load_csv_rows("a_motor_kpi", MOTOR_KPI_CSV, &config.sources["a_motor_kpi"]).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].job_id, "J1");
        assert_eq!(rows[0].total_hours, Some(21.0));
        assert_eq!(rows[0].total_drill, Some(900.0));
        assert_eq!(rows[0].serial, "MTR-48123");
        assert_eq!(rows[0].raw_fields["SN"], "MTR-48123");
    }

    #[test]
    fn load_csv_blank_numerics_become_absent() {
        let csv = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN
J1,,900,MTR-1
";
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let rows = load_csv_rows("a_motor_kpi", csv, &config.sources["a_motor_kpi"]).unwrap();
        assert_eq!(rows[0].total_hours, None);
        assert_eq!(rows[0].total_drill, Some(900.0));
    }

    #[test]
    fn load_csv_garbage_numeric_is_an_error() {
        let csv = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN
J1,twenty,900,MTR-1
";
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let err = load_csv_rows("a_motor_kpi", csv, &config.sources["a_motor_kpi"]).unwrap_err();
        assert!(err.to_string().contains("twenty"));
    }

    #[test]
    fn load_csv_missing_column_is_an_error() {
        let csv = "JOB_NUM,Total Hrs (C+D),SN\nJ1,20,MTR-1\n";
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let err = load_csv_rows("a_motor_kpi", csv, &config.sources["a_motor_kpi"]).unwrap_err();
        assert!(err.to_string().contains("TOTAL_DRILL"));
    }

    #[test]
    fn load_csv_candidate_without_category_is_an_error() {
        let csv = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN,JOB_TYPE
J1,20,890,X48123,
";
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let err = load_csv_rows("c_pog_cam", csv, &config.sources["c_pog_cam"]).unwrap_err();
        assert!(err.to_string().contains("no job category"));
    }

    #[test]
    fn load_csv_candidate_with_unknown_category_is_an_error() {
        let csv = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN,JOB_TYPE
J1,20,890,X48123,MWD
";
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let err = load_csv_rows("c_pog_cam", csv, &config.sources["c_pog_cam"]).unwrap_err();
        assert!(err.to_string().contains("MWD"));
    }

    #[test]
    fn load_csv_reference_category_is_lenient() {
        let csv = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN
J1,20,890,MTR-1
";
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let rows = load_csv_rows("a_motor_kpi", csv, &config.sources["a_motor_kpi"]).unwrap();
        assert_eq!(rows[0].category, None);
    }

    #[test]
    fn integration_remove_directional() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let input = load_all(&config);
        // 3 motor_kpi + 2 cam_tracker + 4 pog_cam, in source name order.
        assert_eq!(input.records.len(), 9);

        let result = run(&config, &input).unwrap();
        let s = &result.summary;
        assert_eq!(s.total_input, 9);
        // J2 pog row has no hours and no drill.
        assert_eq!(s.filtered_empty, 1);
        // J1 pog row: pairwise vs motor_kpi (|20-21|=1, suffix 123).
        assert_eq!(s.directional_duplicates, 1);
        // J3 pog row: aggregate vs cam_tracker (14+15=29, |30-29|=1).
        assert_eq!(s.rental_duplicates, 1);
        assert_eq!(s.duplicates_removed, 1);
        assert_eq!(s.duplicates_flagged, 1);
        // 9 - 1 empty - 1 directional duplicate.
        assert_eq!(s.final_count, 7);

        // Row order preserved, decisions where expected.
        assert_eq!(result.rows.len(), 9);
        let pog_j1 = &result.rows[5];
        assert_eq!(pog_j1.source, "c_pog_cam");
        assert_eq!(pog_j1.verdict, Verdict::Duplicate);
        assert!(!pog_j1.kept);

        let pog_j3 = &result.rows[6];
        assert_eq!(pog_j3.verdict, Verdict::AggregateDuplicate);
        assert!(pog_j3.kept);
        assert!(pog_j3.flagged);

        let pog_j9 = &result.rows[7];
        assert_eq!(pog_j9.verdict, Verdict::NotChecked);
        assert!(pog_j9.kept);
        assert!(!pog_j9.flagged);

        let pog_j2 = &result.rows[8];
        assert!(!pog_j2.kept);
        assert_eq!(pog_j2.verdict, Verdict::NotChecked);
    }

    #[test]
    fn integration_highlight_all() {
        let input_toml = format!("policy = \"highlight_all\"\n{CONFIG}");
        let config = ReconConfig::from_toml(&input_toml).unwrap();
        let input = load_all(&config);

        let result = run(&config, &input).unwrap();
        let s = &result.summary;
        assert_eq!(s.duplicates_removed, 0);
        assert_eq!(s.duplicates_flagged, 2);
        // Only the empty run is dropped.
        assert_eq!(s.final_count, 8);

        let pog_j1 = &result.rows[5];
        assert!(pog_j1.kept);
        assert!(pog_j1.flagged);
    }

    #[test]
    fn result_serializes_with_snake_case_verdicts() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let input = load_all(&config);
        let result = run(&config, &input).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"aggregate_duplicate\""));
        assert!(json.contains("\"not_checked\""));
        assert!(json.contains("\"remove_directional\""));
    }

    #[test]
    fn run_is_idempotent() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let input = load_all(&config);

        let first = run(&config, &input).unwrap();
        let second = run(&config, &input).unwrap();

        assert_eq!(first.rows.len(), second.rows.len());
        for (a, b) in first.rows.iter().zip(&second.rows) {
            assert_eq!(a.verdict, b.verdict);
            assert_eq!(a.kept, b.kept);
            assert_eq!(a.flagged, b.flagged);
        }
        assert_eq!(first.summary.final_count, second.summary.final_count);
    }

    #[test]
    fn run_rejects_candidate_without_category() {
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let mut input = load_all(&config);
        input.records[5].category = None;

        let err = run(&config, &input).unwrap_err();
        assert!(matches!(err, ReconError::MissingCategory { .. }));
    }

    #[test]
    fn empty_reference_rows_do_not_anchor_matches() {
        // A reference row with no hours and no drill is filtered before
        // partitioning and cannot make a candidate a duplicate.
        let config = ReconConfig::from_toml(CONFIG).unwrap();
        let motor = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN
J7,0,0,MTR-7111
";
        let pog = "\
JOB_NUM,Total Hrs (C+D),TOTAL_DRILL,SN,JOB_TYPE
J7,20,800,MTR-7111,Directional
";
        let mut records =
            load_csv_rows("a_motor_kpi", motor, &config.sources["a_motor_kpi"]).unwrap();
        records.extend(load_csv_rows("c_pog_cam", pog, &config.sources["c_pog_cam"]).unwrap());

        let result = run(&config, &ReconInput { records }).unwrap();
        assert_eq!(result.rows[1].verdict, Verdict::NotChecked);
        assert!(result.rows[1].kept);
        assert_eq!(result.summary.filtered_empty, 1);
    }
}
