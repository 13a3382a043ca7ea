//! # Lookupmask - DSL-driven lookup joins over CSV tables
//!
//! Lookupmask enriches or pseudonymizes a "source" CSV by joining it against
//! a "lookup" CSV. A one-line function names the participating columns and
//! picks one of three dialects:
//!
//! - `LOOKUP(...)` copies values from the first lookup row with an equal key
//! - `RAND_LOOKUP(...)` replaces cells with values sampled from the lookup table
//! - `HASH_LOOKUP(...)` matches through digests of normalized, salted keys
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Function   │────▶│ DSL parser  │────▶│  Column     │────▶│ Join engine │──▶ output CSV
//! │   text      │     │ (3 dialects)│     │  validator  │     │ (3 dialects)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                            ▲       ▲
//!                               source CSV ──┘       └── lookup CSV (auto-enc)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use lookupmask::{exact_lookup, parse_lookup, Table};
//!
//! let spec = parse_lookup("LOOKUP(id, DEST=(val), tbl(id, VALUES=(val)))").unwrap();
//! let source = Table::from_records(&["id", "name"], &[&["1", "Ann"]]);
//! let lookup = Table::from_records(&["id", "val"], &[&["1", "X"]]);
//!
//! let output = exact_lookup(&spec, &source, &lookup);
//! assert_eq!(output.headers, vec!["name", "val"]);
//! assert_eq!(output.rows, vec![vec!["Ann", "X"]]);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - In-memory tables
//! - [`parser`] - CSV reading/writing with auto-detection
//! - [`transform`] - DSL, join engines and pipeline
//! - [`validation`] - Column presence checks
//! - [`cache`] - Key index for `CACHE`d lookups
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Caching
pub mod cache;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AlgorithmError, ColumnError, ConfigError, DslError, PipelineError, ServerError, TableError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{OutputTable, Row, Table};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_file_auto,
    write_table, ParsedTable,
};

// =============================================================================
// Re-exports - DSL
// =============================================================================

pub use transform::dsl::{
    parse_function, parse_hash_lookup, parse_lookup, parse_rand_lookup, Dialect,
    ExactLookupSpec, HashLookupSpec, LookupSpec, RandomLookupSpec, TrimMode,
};

// =============================================================================
// Re-exports - Join engines
// =============================================================================

pub use transform::join::{exact_lookup, random_lookup, run_join, DigestAlgorithm, HashJoin};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_columns, ColumnRequirements, ColumnRole, TableSide};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{run_lookup, RunOptions, TableSource};

// =============================================================================
// Re-exports - Config and API
// =============================================================================

pub use api::server::start_server;
pub use api::types::{Status, ValidationResponse};
pub use config::Config;
