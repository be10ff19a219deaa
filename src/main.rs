use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use vrrs::scoring::{validate_scoring, RiskAggregator, ScoringConfig};
use vrrs::vendor::VendorRecord;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score vendor records from JSON files
    Score {
        /// JSON files holding one vendor object or an array of them
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print results as JSON instead of a report
        #[arg(long)]
        json: bool,

        /// Print one line per vendor instead of full reports
        #[arg(long, conflicts_with = "json")]
        summary: bool,

        /// Print tab-separated score, category and vendor name
        #[arg(long, conflicts_with_all = ["json", "summary"])]
        tsv: bool,
    },
    /// Check the scoring configuration and list every problem
    Validate,
    /// Print the built-in configuration as YAML
    Defaults,
}

#[derive(Parser, Debug)]
#[command(name = "vrrs")]
#[command(about = "Vendor Risk Reliability Score calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/vrrs/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = vrrs::telemetry::init(cli.verbose) {
        eprintln!("{}", e);
    }

    match cli.command {
        Commands::Defaults => match vrrs::config::default_config_yaml() {
            Ok(yaml) => {
                print!("{}", yaml);
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("{:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
        Commands::Validate => {
            load_scoring(cli.config);
            println!("Configuration is valid.");
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Score {
            files,
            json,
            summary,
            tsv,
        } => {
            let scoring = load_scoring(cli.config);
            let format = if json {
                OutputFormat::Json
            } else if tsv {
                OutputFormat::Tsv
            } else if summary {
                OutputFormat::Summary
            } else {
                OutputFormat::Report
            };
            let code = match run_score(&scoring, &files, format) {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    EXIT_INPUT
                }
            };
            std::process::exit(code);
        }
    }
}

/// Load and validate the scoring config, exiting with EXIT_CONFIG on failure.
fn load_scoring(path: Option<String>) -> ScoringConfig {
    let config = match vrrs::config::load_config(path.map(PathBuf::from)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let scoring = config.effective_scoring();
    if let Err(errors) = validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    scoring
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Report,
    Summary,
    Tsv,
    Json,
}

fn run_score(scoring: &ScoringConfig, files: &[PathBuf], format: OutputFormat) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let mut vendors: Vec<VendorRecord> = Vec::new();
    for file in files {
        let records = vrrs::vendor::load_vendor_records(file)?;
        tracing::info!(file = %file.display(), records = records.len(), "loaded vendor records");
        vendors.extend(records);
    }

    let aggregator = RiskAggregator::new(scoring);
    let results = aggregator
        .aggregate_batch(&vendors, None)
        .context("Failed to score vendors")?;

    let use_colors = vrrs::output::should_use_colors();
    match format {
        OutputFormat::Json => println!("{}", vrrs::output::format_json(&results)?),
        OutputFormat::Tsv => println!("{}", vrrs::output::format_tsv(&results)),
        OutputFormat::Summary => {
            println!("{}", vrrs::output::format_summary_table(&results, use_colors))
        }
        OutputFormat::Report => {
            let reports: Vec<String> = results
                .iter()
                .map(|r| vrrs::output::format_report(r, use_colors))
                .collect();
            println!("{}", reports.join("\n\n"));
        }
    }

    tracing::debug!(
        vendors = results.len(),
        elapsed = ?start_time.elapsed(),
        "scoring finished"
    );
    Ok(())
}
