use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use anyhow::Result;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use convreport_core::{Config, ConversionState, IssueCatalog, ReportConfig};
use convreport_engine::ReportGenerator;

/// convreport - Schema and data conversion quality reports
#[derive(Parser)]
#[command(name = "convreport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: convreport.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a conversion report from a state snapshot
    Report {
        /// Conversion state snapshot (JSON)
        #[arg(short, long)]
        state: PathBuf,

        /// Per-table counts of rows that failed to write (JSON object)
        #[arg(short, long)]
        bad_writes: Option<PathBuf>,

        /// Output file for the text report (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the structured report as JSON
        #[arg(short, long)]
        json: Option<PathBuf>,

        /// Source was a pg_dump file; include statement stats
        #[arg(long)]
        pg_dump: bool,
    },

    /// List the schema issue catalog
    Catalog,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("convreport.toml").exists() {
        Config::from_file(Path::new("convreport.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Report { state, bad_writes, output, json, pg_dump } => {
            let mut report_config = config.report;
            report_config.from_pg_dump |= pg_dump;
            if output.is_some() {
                report_config.output = output;
            }
            report_command(
                report_config,
                &state,
                bad_writes.as_deref(),
                json.as_deref(),
                cli.verbose,
            )
        }
        Commands::Catalog => {
            catalog_command();
            Ok(())
        }
    }
}

/// Log to stderr, filtered by RUST_LOG
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Report command - write the text report and print the summary
fn report_command(
    config: ReportConfig,
    state_path: &Path,
    bad_writes_path: Option<&Path>,
    json_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading conversion state from:".cyan(), state_path.display());
    }
    let mut conv = ConversionState::from_file(state_path)?;
    tracing::debug!(
        state = %state_path.display(),
        tables = conv.source_schema.len(),
        "loaded conversion state"
    );

    let bad_writes = match bad_writes_path {
        Some(path) => load_bad_writes(path)?,
        None => HashMap::new(),
    };

    let output = config.output.clone();
    let generator = ReportGenerator::new(IssueCatalog::standard(), config);

    // Structured report comes from an untouched copy so unexpected
    // conditions aren't counted twice
    if let Some(path) = json_path {
        let report = generator.conversion_report(&mut conv.clone(), &bad_writes);
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "JSON report saved to:".green(), path.display());
        }
    }

    let summary = match &output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                anyhow::anyhow!("Cannot create report file {}: {}", path.display(), e)
            })?;
            let mut w = BufWriter::new(file);
            let summary = generator.generate(&mut conv, &bad_writes, &mut w)?;
            w.flush()?;
            tracing::info!(path = %path.display(), "wrote conversion report");
            if verbose {
                eprintln!("{} {}", "Report saved to:".green(), path.display());
            }
            summary
        }
        None => {
            let stdout = io::stdout();
            let mut w = BufWriter::new(stdout.lock());
            let summary = generator.generate(&mut conv, &bad_writes, &mut w)?;
            w.flush()?;
            summary
        }
    };

    print_summary(&summary, conv.stats.unexpected.len());

    Ok(())
}

/// Read a JSON object of source table -> failed write count
fn load_bad_writes(path: &Path) -> Result<HashMap<String, i64>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Cannot read bad writes file {}: {}", path.display(), e)
    })?;
    let bad_writes: HashMap<String, i64> = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Invalid bad writes file {}: {}", path.display(), e))?;

    if let Some((table, count)) = bad_writes.iter().find(|(_, count)| **count < 0) {
        return Err(anyhow::anyhow!(
            "Negative bad write count {} for table {}",
            count,
            table
        ));
    }

    Ok(bad_writes)
}

/// Print the summary statement to stderr
fn print_summary(summary: &str, unexpected: usize) {
    eprintln!("\n{}", "=".repeat(60).bright_blue());
    eprintln!("{}", "Conversion Quality".bold().bright_blue());
    eprintln!("{}", "=".repeat(60).bright_blue());

    for line in summary.lines() {
        match line.split_once(": ") {
            Some((label, rest)) => {
                let (rating, detail) = rest.split_once(' ').unwrap_or((rest, ""));
                eprintln!("{}: {} {}", label.bold(), color_rating(rating), detail);
            }
            None => eprintln!("{}", line),
        }
    }

    if unexpected > 0 {
        eprintln!(
            "{} {} unexpected conditions, see the end of the report",
            "⚠".yellow(),
            unexpected.to_string().yellow()
        );
    }
    eprintln!("{}", "=".repeat(60).bright_blue());
}

fn color_rating(rating: &str) -> ColoredString {
    match rating {
        "EXCELLENT" => rating.green().bold(),
        "GOOD" => rating.green(),
        "OK" => rating.yellow(),
        "POOR" => rating.red().bold(),
        _ => rating.dimmed(),
    }
}

/// Catalog command - list every schema issue and how it is reported
fn catalog_command() {
    println!("{}", "Schema Issue Catalog".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());

    for (issue, entry) in IssueCatalog::standard().entries() {
        let severity = if entry.is_warning() {
            entry.severity.to_string().yellow()
        } else {
            entry.severity.to_string().cyan()
        };
        let batched = if entry.batched { " (batched)" } else { "" };
        println!("  [{}] {}{}", severity, issue.as_str().bold(), batched);
        println!("    {}", entry.description);
    }
}
