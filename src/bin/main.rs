//! Cartographer CLI - Discover keys and relationships in CSV files
//!
//! Usage:
//!   cartographer detect <file.csv>... [--mode <mode>] [--min-confidence <tier>]
//!   cartographer keys <file.csv>...
//!   cartographer profile <file.csv>...
//!
//! Examples:
//!   cartographer detect data/orders.csv data/customers.csv
//!   cartographer detect data/*.csv --mode content --format json
//!   cartographer detect data/*.csv --declared schema.json --manual extra.json -v
//!   cartographer detect data/*.csv --format csv > table_relationships.csv
//!   cartographer profile data/*.csv

use cartographer::config::Settings;
use cartographer::inference::{
    resolve, summarize, ColumnSummary, ConfidenceTier, DeclaredRelationship, DetectionMode,
    Engine, KeyColumnMap, ManualRelationship, Relationship,
};
use cartographer::loader::load_csv_files;
use cartographer::table::Table;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cartographer")]
#[command(about = "Cartographer - Infer primary and foreign keys across tables")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (defaults to the standard lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect relationships between tables
    Detect {
        #[command(flatten)]
        detection: DetectionArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the detected primary key of each table
    Keys {
        /// CSV or TSV files, one table each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Summarize the columns of each table with their PK / FK roles
    Profile {
        #[command(flatten)]
        detection: DetectionArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct DetectionArgs {
    /// CSV or TSV files, one table each
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Evidence to use (overrides the settings file)
    #[arg(short, long)]
    mode: Option<ModeArg>,

    /// Minimum confidence tier to report (overrides the settings file)
    #[arg(long)]
    min_confidence: Option<TierArg>,

    /// JSON array of declared relationships
    #[arg(short, long)]
    declared: Option<PathBuf>,

    /// JSON array of manual relationships, appended after all others
    #[arg(long)]
    manual: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum ModeArg {
    Naming,
    Content,
    Both,
    Manual,
}

impl From<ModeArg> for DetectionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Naming => DetectionMode::Naming,
            ModeArg::Content => DetectionMode::Content,
            ModeArg::Both => DetectionMode::Both,
            ModeArg::Manual => DetectionMode::Manual,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum TierArg {
    Low,
    Medium,
    High,
}

impl From<TierArg> for ConfidenceTier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Low => ConfidenceTier::Low,
            TierArg::Medium => ConfidenceTier::Medium,
            TierArg::High => ConfidenceTier::High,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One line per result
    Text,
    /// Pretty-printed JSON
    Json,
    /// CSV with a header row
    Csv,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Detect { detection, format } => cmd_detect(settings, detection, format),
        Commands::Keys { files, format } => cmd_keys(settings, files, format),
        Commands::Profile { detection, format } => cmd_profile(settings, detection, format),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("CARTOGRAPHER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn engine_from(settings: &Settings, args: &DetectionArgs) -> Result<Engine, String> {
    let mut config = settings.engine_config().map_err(|e| e.to_string())?;
    if let Some(mode) = args.mode.clone() {
        config = config.with_mode(mode.into());
    }
    if let Some(tier) = args.min_confidence.clone() {
        config = config.with_min_confidence(tier.into());
    }
    Ok(Engine::new(config))
}

fn read_json_list<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid {} relationships in '{}': {}", what, path.display(), e))
}

fn read_optional<T: DeserializeOwned>(path: Option<&Path>, what: &str) -> Result<Vec<T>, String> {
    path.map(|p| read_json_list(p, what))
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Load the tables and run detection plus resolution.
fn run_detection(
    settings: &Settings,
    args: &DetectionArgs,
) -> Result<(Vec<Table>, Engine, Vec<Relationship>), String> {
    let tables = load_csv_files(&args.files).map_err(|e| format!("Load error: {}", e))?;
    let engine = engine_from(settings, args).map_err(|e| format!("Configuration error: {}", e))?;
    let declared: Vec<DeclaredRelationship> = read_optional(args.declared.as_deref(), "declared")?;
    let manual: Vec<ManualRelationship> = read_optional(args.manual.as_deref(), "manual")?;

    let inferred = engine.detect_relationships(&tables);
    let relationships = resolve(&declared, inferred, &manual);
    Ok((tables, engine, relationships))
}

fn cmd_detect(settings: Settings, args: DetectionArgs, format: OutputFormat) -> ExitCode {
    let relationships = match run_detection(&settings, &args) {
        Ok((_, _, rels)) => rels,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Text => {
            if relationships.is_empty() {
                println!("No relationships found.");
            }
            for rel in &relationships {
                print_relationship(rel);
            }
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&relationships),
        OutputFormat::Csv => print_csv(relationships.iter().map(RelationshipRow::from)),
    }
}

fn print_relationship(rel: &Relationship) {
    println!("{}", rel);
    for reason in &rel.reasons {
        println!("    {}", reason);
    }
}

/// One line of the relationship CSV export.
#[derive(Serialize)]
struct RelationshipRow<'a> {
    from_table: &'a str,
    from_col: &'a str,
    to_table: &'a str,
    to_col: &'a str,
    detected_by: String,
    confidence: &'static str,
    score: String,
    signals: String,
    reasons: String,
}

impl<'a> From<&'a Relationship> for RelationshipRow<'a> {
    fn from(rel: &'a Relationship) -> Self {
        Self {
            from_table: &rel.from_table,
            from_col: &rel.from_column,
            to_table: &rel.to_table,
            to_col: &rel.to_column,
            detected_by: rel.origin(),
            confidence: rel.confidence.as_str(),
            score: format!("{:.3}", rel.score),
            signals: rel
                .signals
                .iter()
                .map(|s| s.bucket.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            reasons: rel.reasons.join("; "),
        }
    }
}

fn cmd_keys(settings: Settings, files: Vec<PathBuf>, format: OutputFormat) -> ExitCode {
    let tables = match load_csv_files(&files) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match settings.engine_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let keys: KeyColumnMap = Engine::new(config).detect_keys(&tables);

    match format {
        OutputFormat::Text => {
            for table in &tables {
                println!("{}: {}", table.name, keys.get(&table.name).unwrap_or("(none)"));
            }
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&keys),
        OutputFormat::Csv => print_csv(tables.iter().map(|t| KeyRow {
            table: &t.name,
            primary_key: keys.get(&t.name).unwrap_or(""),
        })),
    }
}

#[derive(Serialize)]
struct KeyRow<'a> {
    table: &'a str,
    primary_key: &'a str,
}

fn cmd_profile(settings: Settings, args: DetectionArgs, format: OutputFormat) -> ExitCode {
    let (tables, engine, relationships) = match run_detection(&settings, &args) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let keys = engine.detect_keys(&tables);
    let summary = summarize(&tables, &keys, &relationships);

    match format {
        OutputFormat::Text => {
            for table in &tables {
                print_table_summary(table, &summary);
            }
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Csv => print_csv(summary.iter()),
    }
}

fn print_table_summary(table: &Table, summary: &[ColumnSummary]) {
    let mark = |on: bool| if on { "✓" } else { "" };

    println!(
        "[ {} ] {} rows, {} cols",
        table.name,
        table.row_count(),
        table.column_count()
    );
    println!(
        "  {:<24} {:<9} {:>9} {:>9}  {:<2} {:<2}",
        "Column", "Type", "Non-null", "Unique", "PK", "FK"
    );
    for row in summary.iter().filter(|s| s.table == table.name) {
        println!(
            "  {:<24} {:<9} {:>9} {:>9}  {:<2} {:<2}",
            row.column,
            row.type_class.to_string(),
            row.non_null,
            row.unique,
            mark(row.primary_key),
            mark(row.foreign_key)
        );
    }
    println!();
}

fn print_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> ExitCode {
    let mut writer = csv::Writer::from_writer(io::stdout());
    for row in rows {
        if let Err(e) = writer.serialize(row) {
            eprintln!("CSV error: {}", e);
            return ExitCode::FAILURE;
        }
    }
    match writer.flush() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("CSV error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}
