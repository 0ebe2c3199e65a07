//! Application error types

use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Load error: {0}")]
    Load(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("Frame error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("Column not available: {0}")]
    MissingColumn(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not enough data: {0}")]
    InsufficientData(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Input closed")]
    InputClosed,
}

impl AppError {
    /// Shorthand for a row-level parse failure
    pub fn parse(row: usize, message: impl Into<String>) -> Self {
        AppError::Parse {
            row,
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the variant
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Load(_) => "LOAD_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Parse { .. } => "PARSE_ERROR",
            AppError::Frame(_) => "FRAME_ERROR",
            AppError::MissingColumn(_) => "MISSING_COLUMN",
            AppError::InvalidSelection(_) => "INVALID_SELECTION",
            AppError::InvalidRange(_) => "INVALID_RANGE",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::InsufficientData(_) => "INSUFFICIENT_DATA",
            AppError::Model(_) => "MODEL_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::InputClosed => "INPUT_CLOSED",
        }
    }

    /// Whether the console should ask again instead of aborting the command
    pub fn is_reprompt(&self) -> bool {
        matches!(
            self,
            AppError::InvalidSelection(_) | AppError::InvalidRange(_) | AppError::InvalidArgument(_)
        )
    }
}

impl From<linfa::Error> for AppError {
    fn from(err: linfa::Error) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<linfa_linear::LinearError<f64>> for AppError {
    fn from(err: linfa_linear::LinearError<f64>) -> Self {
        AppError::Model(err.to_string())
    }
}

/// Serializable error record written next to JSON chart output
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
