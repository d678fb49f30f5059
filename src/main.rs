use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use covgate::config::{load_thresholds, DEFAULT_THRESHOLD_CONFIG};
use covgate::coverage::{CoverageFormat, CoverageMetric, ReportCollector};
use covgate::report::{write_report, ReportStyle};
use covgate::runner::run_command;
use covgate::session::{SessionController, THRESHOLD_FAILURE_EXIT_CODE};
use covgate::telemetry::init_tracing;
use covgate::threshold::ThresholdRegistry;

const DEFAULT_COVERAGE_REPORT: &str = "lcov.info";

#[derive(Parser)]
#[command(name = "covgate")]
#[command(about = "Enforce per-path coverage thresholds after a test run")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file for thresholds (default: .threshold.json)
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_THRESHOLD_CONFIG)]
    threshold_config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a test command, then check coverage thresholds
    Run {
        #[command(flatten)]
        coverage: CoverageArgs,

        /// Test command and its arguments
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Check thresholds against an existing coverage report
    Check {
        #[command(flatten)]
        coverage: CoverageArgs,
    },

    /// List configured threshold groups
    List,
}

#[derive(Args)]
struct CoverageArgs {
    /// Coverage report written by the test run
    #[arg(long, value_name = "PATH", default_value = DEFAULT_COVERAGE_REPORT)]
    coverage: PathBuf,

    /// Coverage report format
    #[arg(long, value_enum, default_value_t = CoverageFormat::Lcov)]
    format: CoverageFormat,

    /// Per-file percentage to compare against thresholds
    #[arg(long, value_enum, default_value_t = CoverageMetric::Line)]
    metric: CoverageMetric,

    /// Directory absolute report paths are made relative to (default: current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Coverage collection is disabled; skip threshold checks
    #[arg(long)]
    no_cov: bool,

    /// Print the evaluation as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Invalid configuration aborts before any tests run
    let registry = load_thresholds(&cli.threshold_config)
        .with_context(|| format!("Could not load {}", cli.threshold_config.display()))?;

    match cli.command {
        Commands::Run { coverage, command } => cmd_run(registry, &coverage, &command, cli.no_color),
        Commands::Check { coverage } => cmd_check(registry, &coverage, cli.no_color),
        Commands::List => cmd_list(&registry, &cli.threshold_config),
    }
}

fn cmd_run(
    registry: ThresholdRegistry,
    args: &CoverageArgs,
    command: &[String],
    no_color: bool,
) -> Result<i32> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    let started = SystemTime::now();
    let controller = SessionController::new(registry, collector(args, &cwd).written_after(started));

    let result = run_command(command, &cwd)?;
    finish(&controller, args, result.exit_status, no_color)
}

fn cmd_check(registry: ThresholdRegistry, args: &CoverageArgs, no_color: bool) -> Result<i32> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    let controller = SessionController::new(registry, collector(args, &cwd));

    finish(&controller, args, 0, no_color)
}

fn collector(args: &CoverageArgs, cwd: &Path) -> ReportCollector {
    let root = args.root.clone().unwrap_or_else(|| cwd.to_path_buf());

    ReportCollector::new(cwd.join(&args.coverage), args.format)
        .with_metric(args.metric)
        .with_root(root)
        .disabled(args.no_cov)
}

fn finish(
    controller: &SessionController<ReportCollector>,
    args: &CoverageArgs,
    exit_status: i32,
    no_color: bool,
) -> Result<i32> {
    let outcome = match controller.finish(exit_status) {
        Ok(outcome) => outcome,
        Err(e) => {
            // Never replace an existing failure status with our own
            eprintln!("{} {}", "Error:".red().bold(), e);
            return Ok(if exit_status == 0 {
                THRESHOLD_FAILURE_EXIT_CODE
            } else {
                exit_status
            });
        }
    };

    let Some(ref result) = outcome.result else {
        return Ok(outcome.exit_status);
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        serde_json::to_writer_pretty(&mut out, result)?;
        writeln!(out)?;
    } else if let Some(report) = outcome.report() {
        let style = if no_color {
            ReportStyle::plain()
        } else {
            ReportStyle::default()
        };
        write_report(&mut out, &report, style)?;
    }

    Ok(outcome.exit_status)
}

fn cmd_list(registry: &ThresholdRegistry, config_path: &Path) -> Result<i32> {
    if registry.is_empty() {
        println!(
            "  {} {}",
            "No thresholds configured".dimmed(),
            format!("({})", config_path.display()).dimmed()
        );
        return Ok(0);
    }

    println!("{}", "Thresholds:".bold());
    for group in registry.groups() {
        println!(
            "  {} {} {}",
            "•".green(),
            group.pattern().cyan(),
            format!("{}%", group.threshold()).yellow()
        );
    }

    Ok(0)
}
