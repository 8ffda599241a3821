// runrecon CLI - drilling-run duplicate reconciliation

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "runrecon")]
#[command(about = "Reconcile field-usage drilling runs against reference feeds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  runrecon run scorecard.toml
  runrecon run scorecard.toml --json
  runrecon run scorecard.toml --output result.json --csv clean.csv")]
    Run {
        /// Path to the recon TOML config file
        config: PathBuf,

        /// Output JSON result to stdout instead of human summary only
        #[arg(long)]
        json: bool,

        /// Write JSON result to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the cleaned canonical CSV (kept rows, FLAGGED column)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  runrecon validate scorecard.toml")]
    Validate {
        /// Path to the recon TOML config file
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: runrecon <command> [options]");
            eprintln!("       runrecon --help for more information");
            return ExitCode::from(EXIT_USAGE);
        }
        Some(Commands::Run { config, json, output, csv }) => {
            recon::cmd_run(config, json, output, csv)
        }
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
