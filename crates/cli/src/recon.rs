//! `runrecon run` / `runrecon validate` — config-driven reconciliation.

use std::path::{Path, PathBuf};

use runrecon_engine::engine::load_csv_rows;
use runrecon_engine::model::{RowDecision, RunRecord};
use runrecon_engine::{ReconConfig, ReconInput};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME};
use crate::CliError;

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError::new(code, msg)
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    csv_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
        recon_err(EXIT_RUNTIME, format!("cannot read config: {e}"))
            .with_hint(format!("expected a TOML config at {}", config_path.display()))
    })?;

    let config = ReconConfig::from_toml(&config_str)
        .map_err(|e| recon_err(EXIT_INVALID_CONFIG, e.to_string()))?;

    // Resolve source files relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut records: Vec<RunRecord> = Vec::new();
    for (source_name, source_config) in &config.sources {
        let csv_path = base_dir.join(&source_config.file);
        let csv_data = std::fs::read_to_string(&csv_path).map_err(|e| {
            recon_err(EXIT_RUNTIME, format!("cannot read {}: {e}", csv_path.display()))
        })?;
        let rows = load_csv_rows(source_name, &csv_data, source_config)
            .map_err(|e| recon_err(EXIT_RUNTIME, e.to_string()))?;
        records.extend(rows);
    }

    let input = ReconInput { records };

    let result = runrecon_engine::run(&config, &input)
        .map_err(|e| recon_err(EXIT_RUNTIME, e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| recon_err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = csv_file {
        let clean = render_clean_csv(&input.records, &result.rows)
            .map_err(|e| recon_err(EXIT_RUNTIME, format!("cannot render CSV: {e}")))?;
        std::fs::write(path, clean)
            .map_err(|e| recon_err(EXIT_RUNTIME, format!("cannot write CSV: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "recon '{}' ({}): {} rows in — {} empty dropped, {} directional / {} rental duplicates, {} removed, {} flagged, {} rows out",
        result.meta.config_name,
        result.meta.policy,
        s.total_input,
        s.filtered_empty,
        s.directional_duplicates,
        s.rental_duplicates,
        s.duplicates_removed,
        s.duplicates_flagged,
        s.final_count,
    );

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| recon_err(EXIT_RUNTIME, format!("cannot read config: {e}")))?;

    let config = ReconConfig::from_toml(&config_str)
        .map_err(|e| recon_err(EXIT_INVALID_CONFIG, e.to_string()))?;

    eprintln!(
        "config '{}' is valid: {} sources, policy {}, tolerance {}h / {} serial digits",
        config.name,
        config.sources.len(),
        config.policy,
        config.tolerance.hours,
        config.tolerance.serial_suffix_digits,
    );

    Ok(())
}

/// Canonical cleaned CSV: kept rows only, input order, with a FLAGGED
/// column standing in for the original yellow review highlight.
fn render_clean_csv(records: &[RunRecord], rows: &[RowDecision]) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "SOURCE", "JOB_NUM", "JOB_TYPE", "TOTAL_HRS", "TOTAL_DRILL", "SN", "FLAGGED",
        ])
        .map_err(|e| e.to_string())?;

    for decision in rows {
        if !decision.kept {
            continue;
        }
        let record = &records[decision.row];
        let job_type = record.category.map(|c| c.to_string()).unwrap_or_default();
        let hours = format_number(record.total_hours);
        let drill = format_number(record.total_drill);
        writer
            .write_record([
                record.source.as_str(),
                record.job_id.as_str(),
                job_type.as_str(),
                hours.as_str(),
                drill.as_str(),
                record.serial.as_str(),
                if decision.flagged { "yes" } else { "" },
            ])
            .map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, job: &str, hours: Option<f64>) -> RunRecord {
        RunRecord {
            source: source.into(),
            kind: runrecon_engine::model::SourceKind::FieldUsage,
            category: Some(runrecon_engine::model::JobCategory::Rental),
            job_id: job.into(),
            total_hours: hours,
            total_drill: None,
            serial: "SN-1".into(),
            raw_fields: Default::default(),
        }
    }

    fn decision(row: usize, kept: bool, flagged: bool) -> RowDecision {
        RowDecision {
            row,
            source: "pog_cam".into(),
            category: Some(runrecon_engine::model::JobCategory::Rental),
            verdict: runrecon_engine::model::Verdict::NotChecked,
            kept,
            flagged,
        }
    }

    #[test]
    fn clean_csv_keeps_only_kept_rows_in_order() {
        let records = vec![
            record("pog_cam", "J1", Some(20.0)),
            record("pog_cam", "J2", None),
            record("pog_cam", "J3", Some(31.5)),
        ];
        let rows = vec![
            decision(0, true, false),
            decision(1, false, false),
            decision(2, true, true),
        ];

        let csv = render_clean_csv(&records, &rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("SOURCE,JOB_NUM"));
        assert!(lines[1].contains("J1"));
        assert!(lines[1].contains("20"));
        assert!(lines[2].contains("J3"));
        assert!(lines[2].contains("31.5"));
        assert!(lines[2].ends_with("yes"));
    }
}
