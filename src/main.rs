use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

mod analysis;
mod config;
mod discovery;
mod flow;
mod parser;
mod report;
mod uast;

use analysis::detectors::{all_detectors, Detector};
use analysis::{Confidence, Finding, LeakIssue};
use config::Config;
use discovery::{FileFinder, FileType, SourceFile};
use report::Reporter;
use uast::{lower, Language, ParsedUnit};

/// Leakflow - Fast resource-leak detection for Android (Kotlin/Java)
#[derive(Parser, Debug)]
#[command(name = "leakflow")]
#[command(author, version, long_about = None)]
#[command(about = "Fast resource-leak detection for Android (Kotlin/Java)")]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Detectors to run, comma-separated
    /// (cursor, typed-array, transaction, prefs-editor, stream)
    #[arg(long)]
    detect: Option<String>,

    /// Minimum confidence level to report (low, medium, high)
    #[arg(long, default_value = "medium")]
    min_confidence: String,

    /// Enable parallel parsing (enabled by default)
    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Summary output - show statistics only
    #[arg(long)]
    summary: bool,

    /// Compact output - one line per issue
    #[arg(long)]
    compact: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Compact,
    Json,
    Summary,
}

/// Determine the report format from CLI options
fn determine_report_format(cli: &Cli) -> report::ReportFormat {
    // Explicit format flags take precedence
    if cli.summary {
        return report::ReportFormat::Summary;
    }

    if cli.compact {
        return report::ReportFormat::Compact;
    }

    match cli.format {
        OutputFormat::Terminal => report::ReportFormat::Terminal,
        OutputFormat::Compact => report::ReportFormat::Compact,
        OutputFormat::Json => report::ReportFormat::Json,
        OutputFormat::Summary => report::ReportFormat::Summary,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completions
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet);

    info!("Leakflow v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run_analysis(&config, &cli)?;

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path).into_diagnostic()?
    } else {
        Config::from_default_locations(&cli.path).into_diagnostic()?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if let Some(detect) = &cli.detect {
        config.detect = detect.split(',').map(|s| s.trim().to_string()).collect();
    }

    Ok(config)
}

/// Resolve which detectors to run from config flags
fn select_detectors(config: &Config) -> Result<Vec<Box<dyn Detector>>> {
    if config.detect.is_empty() {
        return Ok(all_detectors());
    }

    let mut selected: Vec<LeakIssue> = Vec::new();
    for flag in &config.detect {
        match LeakIssue::from_flag(flag) {
            Some(issue) => selected.push(issue),
            None => {
                return Err(miette::miette!(
                    "unknown detector '{}' (expected one of: {})",
                    flag,
                    LeakIssue::all()
                        .iter()
                        .map(|i| i.flag())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            }
        }
    }

    Ok(all_detectors()
        .into_iter()
        .filter(|d| selected.contains(&d.issue()))
        .collect())
}

fn run_analysis(config: &Config, cli: &Cli) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start_time = Instant::now();

    // Validate detector selection up front so a bad --detect flag fails
    // even when discovery finds nothing
    let detectors = select_detectors(config)?;

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config).into_diagnostic()?;
    let files = finder.find_files(&cli.path).into_diagnostic()?;

    info!("Found {} files to analyze", files.len());

    if files.is_empty() {
        println!("{}", "No Kotlin or Java files found.".yellow());
        return Ok(());
    }

    // Step 2: Parse and lower
    let units: Vec<ParsedUnit> = if cli.parallel {
        if !cli.quiet {
            println!(
                "{}",
                format!("⚡ Parallel mode: parsing {} files...", files.len()).cyan()
            );
        }
        files.par_iter().filter_map(parse_unit).collect()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        info!("Parsing files...");
        let mut units = Vec::with_capacity(files.len());
        for file in &files {
            if let Some(unit) = parse_unit(file) {
                units.push(unit);
            }
            pb.inc(1);
        }
        pb.finish_with_message("Parsing complete");
        units
    };

    let parse_time = start_time.elapsed();
    if cli.parallel && !cli.quiet {
        println!(
            "{}",
            format!(
                "⚡ Parsed {} files in {:.2}s",
                units.len(),
                parse_time.as_secs_f64()
            )
            .green()
        );
    }

    // Step 3: Run detectors
    info!("Running leak detectors...");
    let mut findings: Vec<Finding> = units
        .par_iter()
        .flat_map_iter(|unit| {
            detectors
                .iter()
                .flat_map(move |detector| detector.detect(unit))
        })
        .collect();

    findings.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.location.line.cmp(&b.location.line))
            .then(a.location.column.cmp(&b.location.column))
    });

    // Step 4: Filter by confidence level. An explicit CLI value beats the
    // config file; the built-in default only applies when neither is set.
    let min_confidence = if cli.min_confidence != "medium" {
        parse_confidence(&cli.min_confidence)
    } else {
        parse_confidence(config.min_confidence.as_deref().unwrap_or("medium"))
    };
    let findings: Vec<_> = findings
        .into_iter()
        .filter(|f| f.confidence >= min_confidence)
        .collect();

    info!("Found {} leak candidates", findings.len());

    // Step 5: Report results
    let report_format = determine_report_format(cli);
    let mut report_options = report::ReportOptions::new();
    report_options.output_path = cli.output.clone();
    report_options.base_path = Some(cli.path.clone());
    report_options.files_count = Some(files.len());
    report_options.functions_count =
        Some(units.iter().map(|u| u.functions.len()).sum());

    let reporter = Reporter::with_options(report_format, report_options);
    reporter.report(&findings)?;

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Parse and lower one file, logging and skipping on failure
fn parse_unit(file: &SourceFile) -> Option<ParsedUnit> {
    let language = match file.file_type {
        FileType::Kotlin => Language::Kotlin,
        FileType::Java => Language::Java,
    };
    let source = match std::fs::read_to_string(&file.path) {
        Ok(source) => source,
        Err(e) => {
            warn!(path = %file.path.display(), error = %e, "failed to read file");
            return None;
        }
    };
    match lower::lower_file(&file.path, &source, language) {
        Ok(unit) => Some(unit),
        Err(e) => {
            warn!(path = %file.path.display(), error = %e, "failed to parse file");
            None
        }
    }
}

fn parse_confidence(s: &str) -> Confidence {
    match s.to_lowercase().as_str() {
        "low" => Confidence::Low,
        "medium" => Confidence::Medium,
        "high" => Confidence::High,
        _ => Confidence::Low,
    }
}
