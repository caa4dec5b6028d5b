use crate::oracle::OracleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TuneError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Oracle Error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Demand Schedule Error: {0}")]
    Demand(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Invariant Violation: {0}")]
    Invariant(String),
}

pub type TuneResult<T> = Result<T, TuneError>;
