use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad source kind, missing category mapping, etc.).
    ConfigValidation(String),
    /// Missing required column in input data.
    MissingColumn { source: String, column: String },
    /// Numeric cell parse error (blank cells are fine; garbage is not).
    NumberParse { source: String, row: usize, column: String, value: String },
    /// A field-usage row without a category cannot be assigned a reference pool.
    MissingCategory { source: String, row: usize },
    /// A field-usage row with an unrecognized category value.
    CategoryParse { source: String, row: usize, value: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "source '{source}': missing column '{column}'")
            }
            Self::NumberParse { source, row, column, value } => {
                write!(f, "source '{source}', row {row}: cannot parse '{column}' value '{value}'")
            }
            Self::MissingCategory { source, row } => {
                write!(f, "source '{source}', row {row}: field-usage row has no job category")
            }
            Self::CategoryParse { source, row, value } => {
                write!(f, "source '{source}', row {row}: unknown job category '{value}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
