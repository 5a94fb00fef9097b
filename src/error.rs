// ⚠️ Pipeline Errors
// Every fatal condition of the pipeline gets its own variant, so callers can
// tell a missing file apart from a GDP series without a recession.

use crate::join::TownGroup;
use crate::quarter::Quarter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist
    #[error("input file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Input file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV framing error (bad quoting, invalid UTF-8, ...)
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Spreadsheet container could not be decoded
    #[error("failed to read workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// A row that parsed as CSV but carries unusable content
    #[error("malformed row {line} in {}: {reason}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("anchor quarter {anchor} not found in GDP series")]
    AnchorNotFound { anchor: Quarter },

    #[error("anchor quarter {anchor} needs {required} preceding rows, found {available}")]
    InsufficientLookback {
        anchor: Quarter,
        required: usize,
        available: usize,
    },

    /// No window of the GDP series matched the requested trend
    #[error("no {pattern} pattern found in GDP series")]
    PatternNotFound { pattern: &'static str },

    /// One side of the join has no usable price ratios
    #[error("join produced no {group} records with a price ratio")]
    EmptyJoinResult { group: TownGroup },

    #[error("invalid quarter label: {0:?}")]
    InvalidQuarter(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Map an I/O failure on `path`, promoting NotFound to its own variant
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            PipelineError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PipelineError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn from_csv(path: &Path, source: csv::Error) -> Self {
        PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn from_workbook(path: &Path, source: calamine::Error) -> Self {
        PipelineError::Workbook {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        PipelineError::MalformedRow {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}
