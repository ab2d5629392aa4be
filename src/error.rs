use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No raw run files found in {}", dir.display())]
    NoInputFiles { dir: PathBuf },

    #[error("column not found: {column} (looking for `{needle}` in {})", path.display())]
    ColumnNotFound {
        column: &'static str,
        needle: &'static str,
        path: PathBuf,
    },

    #[error("{} has no header after the {skipped}-line preamble", path.display())]
    MissingHeader { path: PathBuf, skipped: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to render {name}: {message}")]
    Plot { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
