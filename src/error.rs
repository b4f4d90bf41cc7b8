//! Error types for framelint.

use std::path::PathBuf;
use thiserror::Error;

/// Crate error type.
///
/// Column-reference failures are never errors — they surface as
/// [`crate::diagnostics::Diagnostic`]s. This enum covers the recoverable
/// domain failures and the conditions that abort a file or a run.
#[derive(Debug, Error)]
pub enum Error {
    /// The syntax ingester could not parse a file. Aborts that file only.
    #[error("cannot parse {path}: {message} at {line}:{column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// A regex column set was asked for a concrete member list.
    #[error("cannot expand regex column set '{pattern}' to a concrete column list")]
    RegexExpansion { pattern: String },

    /// A column-set pattern failed to compile.
    #[error("invalid column pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Two schemas disagree on a column's type or nullability.
    #[error("conflicting definitions for column '{column}': {left} vs {right}")]
    SchemaConflict {
        column: String,
        left: String,
        right: String,
    },

    /// The `[tool.framelint]` table is malformed. Aborts the run.
    #[error("invalid [tool.framelint] configuration: {0}")]
    Config(String),

    /// The caller's cancel token was triggered mid-analysis.
    #[error("analysis cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
