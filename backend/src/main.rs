//! Lookupmask CLI - DSL-driven lookup joins over CSV files
//!
//! # Main Commands
//!
//! ```bash
//! lookupmask serve                                   # Start HTTP server (port 3000)
//! lookupmask lookup -s src.csv -l lkp.csv -f 'LOOKUP(id, t(id, v))'
//! lookupmask rand-lookup -s src.csv -l names.csv -f 'RAND_LOOKUP(names, name)'
//! lookupmask hash-lookup -s src.csv -l lkp.csv -f 'HASH_LOOKUP(id, DEST=(v), t(id, v))'
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! lookupmask check 'LOOKUP(id, t(id, v))'   # Parse a function, print it as JSON
//! lookupmask inspect input.csv              # Show detected encoding, separator, columns
//! ```

use clap::{Parser, Subcommand};
use lookupmask::{
    parse_file_auto, parse_function, run_lookup, Config, Dialect, RunOptions, Status, TableSource,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lookupmask")]
#[command(about = "Enrich or pseudonymize CSV files with lookup functions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct LookupArgs {
    /// Source CSV file
    #[arg(short, long)]
    source: PathBuf,

    /// Lookup CSV file
    #[arg(short, long)]
    lookup: PathBuf,

    /// Function text, e.g. 'LOOKUP(id, DEST=(v), t(id, VALUES=(v)))'
    #[arg(short, long)]
    function: String,

    /// Output root directory (default: $LOOKUPMASK_OUTPUT_DIR or ./output)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Exact-match lookup: LOOKUP(...)
    Lookup(LookupArgs),

    /// Random-sample lookup: RAND_LOOKUP(...)
    RandLookup(LookupArgs),

    /// Hash-mediated lookup: HASH_LOOKUP(...)
    HashLookup(LookupArgs),

    /// Parse a function of any dialect and print the result
    Check {
        /// Function text
        function: String,
    },

    /// Show how a CSV file is read
    Inspect {
        /// Input CSV file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $LOOKUPMASK_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lookup(args) => cmd_lookup(Dialect::Exact, args).await,
        Commands::RandLookup(args) => cmd_lookup(Dialect::Random, args).await,
        Commands::HashLookup(args) => cmd_lookup(Dialect::Hash, args).await,
        Commands::Check { function } => cmd_check(&function),
        Commands::Inspect { input } => cmd_inspect(&input),
        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_lookup(dialect: Dialect, args: LookupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let options = RunOptions {
        output_dir: args.output_dir.unwrap_or(config.output_dir),
    };

    eprintln!("📄 {}: {} ⟵ {}", dialect, args.source.display(), args.lookup.display());

    let response = run_lookup(
        dialect,
        &args.function,
        TableSource::path(args.source),
        TableSource::path(args.lookup),
        &options,
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&response)?);

    match response.status {
        Status::Success => {
            eprintln!("\n✨ Done!");
            Ok(())
        }
        Status::Failed => {
            eprintln!("\n❌ {} problem(s) found", response.messages.len());
            std::process::exit(1);
        }
        Status::Error => Err(response.messages.join("; ").into()),
    }
}

fn cmd_check(function: &str) -> Result<(), Box<dyn std::error::Error>> {
    match parse_function(function) {
        Ok(spec) => {
            eprintln!("✅ Valid {} function", spec.dialect());
            println!("{}", serde_json::to_string_pretty(&spec)?);
            Ok(())
        }
        Err(errors) => {
            eprintln!("❌ {} error(s):", errors.len());
            for err in &errors {
                eprintln!("   - {}", err);
            }
            std::process::exit(1);
        }
    }
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading CSV: {}", input.display());

    let parsed = parse_file_auto(input)?;
    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        match parsed.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        }
    );
    eprintln!("   Columns: {}", parsed.table.headers.join(", "));
    eprintln!("✅ Read {} rows", parsed.table.len());

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config.port = port;
    }
    lookupmask::start_server(config).await?;
    Ok(())
}
