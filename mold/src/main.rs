//! Mold CLI - Transform CSV files and declare their SQL tables
//!
//! # Commands
//!
//! ```bash
//! mold transform input.csv --config fields.json    # Mold CSV rows to JSON
//! mold sql --config fields.json --table people     # Print CREATE / INSERT
//! mold load input.csv --config fields.json \
//!     --table people --database people.db --create # Load into SQLite
//! mold check --config fields.json --dialect sqlite # Schema check + lint
//! mold types                                       # List conversion types
//! ```
//!
//! `--config`, `--database` and `--dialect` fall back to `MOLD_CONFIG`,
//! `MOLD_DATABASE` and `MOLD_DIALECT`; a `.env` file is read if present.

use clap::{ArgAction, Parser, Subcommand};
use log::debug;
use mold::{
    check_row_config, lint, mold_csv_file, Dialect, RowConfig, RowDeclarator, RowTransform,
    TypeRegistry,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mold")]
#[command(about = "Config-driven record transforms and SQL declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a CSV file and output JSON records
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Row configuration (JSON array of field configs)
        #[arg(short, long, env = "MOLD_CONFIG")]
        config: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the create-table and insert statements for a configuration
    Sql {
        /// Row configuration (JSON array of field configs)
        #[arg(short, long, env = "MOLD_CONFIG")]
        config: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// Target dialect (sqlite or postgres)
        #[arg(long, env = "MOLD_DIALECT", default_value = "sqlite", value_parser = parse_dialect)]
        dialect: Dialect,
    },

    /// Transform a CSV file and insert the records into SQLite
    #[cfg(feature = "sqlite")]
    Load {
        /// Input CSV file
        input: PathBuf,

        /// Row configuration (JSON array of field configs)
        #[arg(short, long, env = "MOLD_CONFIG")]
        config: PathBuf,

        /// Table name
        #[arg(short, long)]
        table: String,

        /// SQLite database file
        #[arg(long, env = "MOLD_DATABASE")]
        database: PathBuf,

        /// Create the table before inserting
        #[arg(long)]
        create: bool,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Check a configuration against the schema and lint its fields
    Check {
        /// Row configuration (JSON array of field configs)
        #[arg(short, long, env = "MOLD_CONFIG")]
        config: PathBuf,

        /// Also check storage types for this dialect (sqlite or postgres)
        #[arg(long, env = "MOLD_DIALECT", value_parser = parse_dialect)]
        dialect: Option<Dialect>,
    },

    /// List conversion types and their storage types
    Types,
}

fn parse_dialect(name: &str) -> Result<Dialect, String> {
    Dialect::by_name(name)
        .ok_or_else(|| format!("unknown dialect `{}` (expected sqlite or postgres)", name))
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Transform {
            input,
            config,
            delimiter,
            output,
        } => cmd_transform(&input, &config, delimiter, output.as_deref()),

        Commands::Sql {
            config,
            table,
            dialect,
        } => cmd_sql(&config, &table, &dialect),

        #[cfg(feature = "sqlite")]
        Commands::Load {
            input,
            config,
            table,
            database,
            create,
            delimiter,
        } => cmd_load(&input, &config, &table, &database, create, delimiter),

        Commands::Check { config, dialect } => cmd_check(&config, dialect.as_ref()),

        Commands::Types => cmd_types(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_row(config: &Path) -> Result<RowTransform, Box<dyn std::error::Error>> {
    debug!("Loading row config from {}", config.display());
    Ok(RowTransform::new(RowConfig::from_file(config)?))
}

fn cmd_transform(
    input: &Path,
    config: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let row = load_row(config)?;
    let result = mold_csv_file(input, &row, delimiter)?;

    eprintln!("   Encoding: {}", result.csv_info.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.csv_info.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Rows: {}", result.csv_info.row_count);
    eprintln!("   Columns: {}", result.csv_info.headers.join(", "));
    eprintln!("⚙️  Molded {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_sql(config: &Path, table: &str, dialect: &Dialect) -> Result<(), Box<dyn std::error::Error>> {
    let row = load_row(config)?;
    let declarator = RowDeclarator::new(&row, dialect);

    println!("{};", declarator.create_statement(table)?);
    println!("{};", declarator.insert_statement(table)?);
    Ok(())
}

#[cfg(feature = "sqlite")]
fn cmd_load(
    input: &Path,
    config: &Path,
    table: &str,
    database: &Path,
    create: bool,
    delimiter: Option<char>,
) -> Result<(), Box<dyn std::error::Error>> {
    use mold::{parse_csv_file, SqliteExecutor};

    eprintln!("📄 Loading: {}", input.display());

    let row = load_row(config)?;
    let dialect = Dialect::sqlite();
    let executor = SqliteExecutor::new(RowDeclarator::new(&row, &dialect));

    let parsed = parse_csv_file(input, delimiter)?;
    eprintln!("   Rows: {}", parsed.records.len());

    let mut conn = rusqlite::Connection::open(database)?;
    if create {
        executor.create_table(&conn, table)?;
        eprintln!("   Created table: {}", table);
    }

    let inserted = executor.insert_all(&mut conn, table, &parsed.records)?;
    eprintln!("✅ Inserted {} records into {} ({})", inserted, table, database.display());
    Ok(())
}

fn cmd_check(config: &Path, dialect: Option<&Dialect>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking: {}", config.display());

    let content = fs::read_to_string(config)?;
    let document: Value = serde_json::from_str(&content)?;
    let row = RowTransform::new(check_row_config(&document)?);

    let findings = lint(&row, dialect);

    if findings.is_empty() {
        eprintln!("   ✅ {} fields, no problems found", row.len());
        return Ok(());
    }

    for finding in &findings {
        println!("   - {}", finding);
    }
    Err(format!("{} problem(s) found", findings.len()).into())
}

fn cmd_types() -> Result<(), Box<dyn std::error::Error>> {
    let registry = TypeRegistry::standard();
    let names: Vec<&str> = registry.names().collect();
    println!("Conversion types: {}", names.join(", "));

    for dialect in [Dialect::sqlite(), Dialect::postgres()] {
        println!("\n{} ({}):", dialect.name(), dialect.placeholder_list(2));
        for (type_name, storage_type) in dialect.storage_types() {
            println!("  {:<10} {}", type_name, storage_type);
        }
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
