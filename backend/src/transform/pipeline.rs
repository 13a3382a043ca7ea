//! High-level pipeline: one lookup request from function text to output file.
//!
//! Steps:
//! 1. Parse the function with the requested dialect
//! 2. Resolve the digest algorithm (hash dialect)
//! 3. Read both tables concurrently
//! 4. Check column presence in both headers
//! 5. Run the join engine
//! 6. Write `<output_dir>/<dialect>/output_<ddHHMMSS>_<id>.csv`
//!
//! Problems with the function or the headers end the request as `FAILED`
//! with every message collected; unexpected failures end it as `ERROR`.
//!
//! # Example
//!
//! ```rust,ignore
//! use lookupmask::transform::pipeline::{run_lookup, RunOptions, TableSource};
//! use lookupmask::transform::dsl::Dialect;
//!
//! #[tokio::main]
//! async fn main() {
//!     let response = run_lookup(
//!         Dialect::Exact,
//!         "LOOKUP(id, DEST=(val), tbl(id, VALUES=(val)))",
//!         TableSource::path("source.csv"),
//!         TableSource::path("lookup.csv"),
//!         &RunOptions::default(),
//!     )
//!     .await;
//!     println!("{:?}", response);
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::Local;
use uuid::Uuid;

use crate::api::logs::RequestLog;
use crate::api::types::ValidationResponse;
use crate::config::{Config, DEFAULT_OUTPUT_DIR};
use crate::error::{AlgorithmError, PipelineError, PipelineResult, TableError, TableResult};
use crate::models::{OutputTable, Table};
use crate::parser::{parse_bytes_auto, table_to_bytes, ParsedTable};
use crate::transform::dsl::{parse_for, Dialect, LookupSpec};
use crate::transform::join::{run_join, DigestAlgorithm};
use crate::validation::validate_columns;

/// Where a table comes from.
#[derive(Debug, Clone)]
pub enum TableSource {
    /// A CSV file on disk
    Path(PathBuf),
    /// An uploaded CSV body
    Bytes { name: String, data: Vec<u8> },
}

impl TableSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        TableSource::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        TableSource::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Display name for logs.
    pub fn name(&self) -> String {
        match self {
            TableSource::Path(path) => path.display().to_string(),
            TableSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Read and parse the table.
    pub async fn load(self) -> TableResult<ParsedTable> {
        match self {
            TableSource::Path(path) => {
                let bytes = tokio::fs::read(&path).await?;
                parse_bytes_auto(&bytes)
            }
            TableSource::Bytes { data, .. } => parse_bytes_auto(&data),
        }
    }
}

/// Options for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Root output directory; the dialect's sub-directory is created below it
    pub output_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
        }
    }
}

/// Run one lookup request end to end.
pub async fn run_lookup(
    dialect: Dialect,
    function: &str,
    source: TableSource,
    lookup: TableSource,
    options: &RunOptions,
) -> ValidationResponse {
    let log = RequestLog::new();
    log.info(format!("🔎 {} request", dialect));
    log.info_indent(function.trim(), 1);

    // Step 1: Parse function
    let spec = match parse_for(dialect, function) {
        Ok(spec) => spec,
        Err(errors) => {
            log.warning(format!("Function rejected with {} error(s)", errors.len()));
            for e in &errors {
                log.warning_indent(e.to_string(), 1);
            }
            return errors.into();
        }
    };
    log.success(format!("Parsed function (lookup table '{}')", spec.lookup_table_name()));

    // Step 2: Algorithm, before any table is read
    if let Err(e) = check_algorithm(&spec) {
        log.warning(e.to_string());
        return ValidationResponse::failed(vec![e.to_string()]);
    }

    match execute(&spec, source, lookup, options, &log).await {
        Ok(response) => response,
        Err(e) => {
            log.error(e.to_string());
            ValidationResponse::error(e.to_string())
        }
    }
}

async fn execute(
    spec: &LookupSpec,
    source: TableSource,
    lookup: TableSource,
    options: &RunOptions,
    log: &RequestLog,
) -> PipelineResult<ValidationResponse> {
    // Step 3: Read tables
    log.info(format!("📖 Reading {} and {}...", source.name(), lookup.name()));
    let (source, lookup) = tokio::join!(source.load(), lookup.load());
    let source = source.map_err(PipelineError::Source)?;
    let lookup = lookup.map_err(PipelineError::Lookup)?;
    log_table(log, "Source", &source);
    log_table(log, "Lookup", &lookup);

    // Step 4: Column presence
    let missing = validate_columns(spec, &source.table.headers, &lookup.table.headers).await;
    if !missing.is_empty() {
        log.warning(format!("{} column(s) missing", missing.len()));
        return Ok(missing.into());
    }
    log.success("All columns present");

    // Step 5: Join
    let output = join(spec, &source.table, &lookup.table)?;
    log.success(format!("Joined {} row(s)", output.len()));

    // Step 6: Write
    let path = output_path(&options.output_dir, spec.dialect());
    write_output(&path, &output).await?;
    log.success(format!("💾 Saved to {}", path.display()));

    Ok(ValidationResponse::success(vec![
        path.display().to_string(),
        format!("{} row(s) written", output.len()),
    ]))
}

fn check_algorithm(spec: &LookupSpec) -> Result<(), AlgorithmError> {
    match spec {
        LookupSpec::Hash(hash) => hash.algorithm.parse::<DigestAlgorithm>().map(|_| ()),
        LookupSpec::Exact(_) | LookupSpec::Random(_) => Ok(()),
    }
}

/// Sync so the thread-local RNG never lives across an await.
fn join(spec: &LookupSpec, source: &Table, lookup: &Table) -> PipelineResult<OutputTable> {
    let mut rng = rand::thread_rng();
    Ok(run_join(spec, source, lookup, &mut rng)?)
}

fn log_table(log: &RequestLog, label: &str, parsed: &ParsedTable) {
    log.info_indent(
        format!(
            "{}: {} row(s), {} column(s), encoding {}, separator '{}'",
            label,
            parsed.table.len(),
            parsed.table.headers.len(),
            parsed.encoding,
            format_delimiter(parsed.delimiter)
        ),
        1,
    );
}

fn format_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

/// `<root>/<dialect dir>/output_<ddHHMMSS>_<id>.csv`
pub fn output_path(root: &Path, dialect: Dialect) -> PathBuf {
    let stamp = Local::now().format("%d%H%M%S");
    let id = Uuid::new_v4().simple().to_string();
    root.join(dialect.output_dir())
        .join(format!("output_{}_{}.csv", stamp, &id[..8]))
}

async fn write_output(path: &Path, output: &OutputTable) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = table_to_bytes(output).map_err(PipelineError::Output)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| PipelineError::Output(TableError::Io(e)))
}
