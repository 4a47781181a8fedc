//! Error types for rp-plan

use thiserror::Error;

/// Plan loading error
#[derive(Error, Debug)]
pub enum PlanError {
    /// P001: Plan file could not be read
    #[error("[P001] Cannot read plan file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// P002: Plan document is not valid JSON for the plan model
    #[error("[P002] Invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// P003: Plan document is empty
    #[error("[P003] Plan document is empty")]
    Empty,
}

/// Result type alias for PlanError
pub type PlanResult<T> = Result<T, PlanError>;
