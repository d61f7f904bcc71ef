use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Cannot build an index from zero vectors")]
    EmptyIndex,

    #[error("Search limit must be positive")]
    InvalidK,

    #[error("Invalid catalog entry: {0}")]
    InvalidEntry(String),

    #[error("Catalog is missing required column: {0}")]
    MissingColumn(String),

    #[error("Catalog row at line {line} has no value for column '{column}'")]
    InvalidRow { line: u64, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
