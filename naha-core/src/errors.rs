use thiserror::Error;

///
/// Problems with the contents of an input file. These are fatal for the file being read.
///
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("No accession identifier found in header on line {line}: {header}")]
    MissingIdentifier { header: String, line: usize },

    #[error("Sequence data found before the first header on line {line}")]
    SequenceBeforeHeader { line: usize },

    #[error("Missing required columns in {path}: {}", columns.join(", "))]
    MissingColumns { path: String, columns: Vec<String> },

    #[error("Invalid value '{value}' in column {column} on row {row}")]
    InvalidField {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

///
/// Malformed parameters. Raised before any record is processed.
///
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Pattern is empty")]
    EmptyPattern,

    #[error("Invalid pattern '{pattern}' at position {position}: {reason}")]
    InvalidPattern {
        pattern: String,
        position: usize,
        reason: String,
    },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Minimum date {min} is after maximum date {max}")]
    InvalidDateWindow { min: String, max: String },

    #[error("Incompatible options: {0}")]
    IncompatibleOptions(String),

    #[error("Can't load config file {path}: {reason}")]
    ConfigFile { path: String, reason: String },
}

///
/// Failure of a join between two isolate tables.
///
#[derive(Error, Debug, PartialEq)]
pub enum MergeError {
    #[error(
        "No identifiers shared between the stalk table ({stalk_records} records) and the motif table ({motif_records} records)"
    )]
    NoOverlap {
        stalk_records: usize,
        motif_records: usize,
    },
}
