use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("No header row in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("Unknown transaction type '{value}' on row {row}")]
    UnknownType { row: usize, value: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CleanError>;
