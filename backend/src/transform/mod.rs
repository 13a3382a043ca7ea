//! Transformation module.
//!
//! - DSL: lookup function parsing
//! - Join: the three join engines
//! - Pipeline: one request from function text to output file

pub mod dsl;
pub mod join;
pub mod pipeline;

pub use dsl::{parse_function, LookupSpec};
pub use join::run_join;
pub use pipeline::run_lookup;
