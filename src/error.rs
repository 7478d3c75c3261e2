//! Error types for netdyn

use thiserror::Error;

/// Main error type for model construction and fitting
#[derive(Error, Debug)]
pub enum NetdynError {
    #[error("Invalid expression matrix: {reason}")]
    InvalidExpressionMatrix { reason: String },

    #[error("Invalid metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("Invalid adjacency matrix: {reason}")]
    InvalidAdjacency { reason: String },

    #[error("Invalid model parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Time points must be strictly ascending: {reason}")]
    NonAscendingTimePoints { reason: String },

    #[error("Unknown gene '{gene_id}' in {context}")]
    UnknownGene { gene_id: String, context: String },

    #[error("Empty gene selection: at least one gene is required")]
    EmptySelection,

    #[error("Required inputs missing or inconsistent: {}", missing.join("; "))]
    DataNotLoaded { missing: Vec<String> },

    #[error("Integration diverged at t = {t}: {reason}")]
    IntegrationDiverged { t: f64, reason: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for netdyn operations
pub type Result<T> = std::result::Result<T, NetdynError>;
