//! Error types for rp-sql

use thiserror::Error;

/// Conversion error.
///
/// Every variant aborts the whole conversion; no partial SQL is returned.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// C001: The plan is malformed (dangling field reference, unresolved
    /// correlation id, arity mismatch, row type disagreement)
    #[error("[C001] Structural error in {node}: {message}")]
    StructuralError { node: String, message: String },

    /// C002: The plan uses something the target dialect cannot express
    #[error("[C002] Unsupported construct in {node}: {construct}")]
    UnsupportedConstruct { node: String, construct: String },

    /// C003: An expression has the wrong type for its position
    #[error("[C003] Type mismatch in {node}: expected {expected}, found {found} in `{expr}`")]
    TypeMismatch {
        node: String,
        expected: String,
        found: String,
        expr: String,
    },

    /// C004: Generated text failed the post-conversion parse check
    #[error("[C004] Generated SQL does not parse (line {line}, column {column}): {message}")]
    InvalidOutput {
        message: String,
        line: usize,
        column: usize,
        sql: String,
    },

    /// C005: Converter configuration could not be loaded
    #[error("[C005] Invalid converter config: {message}")]
    Config { message: String },
}

impl ConvertError {
    pub(crate) fn structural(node: &str, message: impl Into<String>) -> Self {
        ConvertError::StructuralError {
            node: node.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(node: &str, construct: impl Into<String>) -> Self {
        ConvertError::UnsupportedConstruct {
            node: node.to_string(),
            construct: construct.into(),
        }
    }
}

/// Result type alias for ConvertError
pub type ConvertResult<T> = Result<T, ConvertError>;
