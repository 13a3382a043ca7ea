//! Error types for the lookup masking pipeline.
//!
//! Two families live here:
//!
//! - Collected errors ([`DslError`], [`ColumnError`]) are returned as data,
//!   in a `Vec`, so one failed request reports every defect at once.
//! - Propagated errors ([`TableError`], [`AlgorithmError`], [`PipelineError`],
//!   [`ConfigError`], [`ServerError`]) travel with `?` and are turned into a
//!   single response message at the boundary.
//!
//! Error conversion is automatic via `From` implementations where the source
//! is unambiguous.

use thiserror::Error;

use crate::validation::{ColumnRole, TableSide};

// =============================================================================
// DSL Errors (collected)
// =============================================================================

/// A defect found while parsing a lookup function string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DslError {
    /// Missing prefix/suffix, empty body, malformed payload, unrecognized token.
    #[error("{0}")]
    Grammar(String),

    /// A field the dialect requires was not supplied.
    #[error("{function}: missing required {field}")]
    MissingField {
        function: &'static str,
        field: &'static str,
    },

    /// Two column lists that are aligned by position differ in length.
    #[error("{left} and {right} must have the same number of columns ({left_len} vs {right_len})")]
    ArityMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },
}

impl DslError {
    pub fn grammar(message: impl Into<String>) -> Self {
        Self::Grammar(message.into())
    }
}

// =============================================================================
// Column Presence Errors (collected)
// =============================================================================

/// A column declared by a lookup function is absent from a table header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing {role} column in {table} CSV: {column}")]
pub struct ColumnError {
    pub column: String,
    pub role: ColumnRole,
    pub table: TableSide,
}

// =============================================================================
// Table I/O Errors
// =============================================================================

/// Errors while reading or writing a CSV table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// The header row has no usable column names.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// The same column name appears twice in the header row.
    #[error("Duplicate column in CSV header: {0}")]
    DuplicateHeader(String),
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(io) => TableError::Io(io),
            other => TableError::Parse {
                line,
                message: format!("{:?}", other),
            },
        }
    }
}

// =============================================================================
// Digest Errors
// =============================================================================

/// Unknown digest algorithm identifier in `ALGO=`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported digest algorithm '{0}' (expected one of SHA-224, SHA-256, SHA-384, SHA-512, SHA-512/224, SHA-512/256)")]
pub struct AlgorithmError(pub String);

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Unexpected failures while running one lookup request.
///
/// Anything that is a user-facing validation problem is collected instead;
/// these are surfaced as a single `ERROR` response.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source table could not be read.
    #[error("Error reading source CSV file: {0}")]
    Source(TableError),

    /// Lookup table could not be read.
    #[error("Error reading lookup CSV file: {0}")]
    Lookup(TableError),

    /// Output table could not be written.
    #[error("Error writing output CSV file: {0}")]
    Output(TableError),

    /// Unknown digest algorithm.
    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),

    /// Filesystem error outside table parsing.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result of parsing one function string.
pub type ParseResult<T> = Result<T, Vec<DslError>>;

/// Result type for table I/O.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_format() {
        let err = DslError::MissingField {
            function: "LOOKUP",
            field: "lookup table name",
        };
        assert_eq!(err.to_string(), "LOOKUP: missing required lookup table name");
    }

    #[test]
    fn test_arity_mismatch_format() {
        let err = DslError::ArityMismatch {
            left: "DEST",
            left_len: 2,
            right: "VALUES",
            right_len: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("DEST and VALUES"));
        assert!(msg.contains("(2 vs 1)"));
    }

    #[test]
    fn test_column_error_format() {
        let err = ColumnError {
            column: "zip".into(),
            role: ColumnRole::LookupValue,
            table: TableSide::Lookup,
        };
        assert_eq!(err.to_string(), "Missing lookup value column in lookup CSV: zip");
    }

    #[test]
    fn test_pipeline_error_names_table() {
        let err = PipelineError::Lookup(TableError::EmptyFile);
        assert!(err.to_string().contains("lookup CSV"));
        assert!(err.to_string().contains("empty"));

        let err: PipelineError = AlgorithmError("MD4".into()).into();
        assert!(err.to_string().contains("MD4"));
    }
}
