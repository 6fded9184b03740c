//! Binary entry point for monitoring-synth.
//!
//! Renders or checks the collector template data for a `Monitoring`
//! manifest on disk.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use monitoring_synth::config::SynthConfig;
use monitoring_synth::observability::{self, LoggingConfig};
use monitoring_synth::reconcile::scope_reconcile_context;
use monitoring_synth::{
    ExporterAssembler, Monitoring, ReconcileContext, ReconciliationRequest, TemplateDataBuilder,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Monitoring synth - validates custom metrics exporters and renders
/// collector template data.
#[derive(Parser)]
#[command(name = "monitoring-synth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Build template data for a manifest and print it.
    Render {
        /// Path to the `Monitoring` manifest.
        #[arg(short, long)]
        input: PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Report every problem with a manifest's custom exporters.
    Check {
        /// Path to the `Monitoring` manifest.
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Output format for `render`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    let context = ReconcileContext::new();
    let scoped = context.clone();
    let result =
        scope_reconcile_context(scoped, async move { run_command(cli, config, &context) }).await;

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(
    cli: Cli,
    config: SynthConfig,
    context: &ReconcileContext,
) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Render { input, format } => cmd_render(&config, context, &input, format),
        Commands::Check { input } => cmd_check(&input),
    }
}

/// Loads configuration.
fn load_config(path: Option<&Path>) -> monitoring_synth::Result<SynthConfig> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return SynthConfig::load_from_file(config_path);
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("MONITORING_SYNTH_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return SynthConfig::load_from_file(Path::new(&config_path));
        }
    }

    Ok(SynthConfig::load_default())
}

fn load_manifest(path: &Path) -> anyhow::Result<Monitoring> {
    let manifest = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    Monitoring::from_yaml(&manifest).with_context(|| format!("in manifest {}", path.display()))
}

/// Render command.
fn cmd_render(
    config: &SynthConfig,
    context: &ReconcileContext,
    input: &Path,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let request = ReconciliationRequest::new(load_manifest(input)?);
    let data = TemplateDataBuilder::new()
        .with_defaults(config.defaults.clone())
        .build(context, &request)?;

    let rendered = match format {
        OutputFormat::Json => data.to_json()?,
        OutputFormat::Yaml => data.to_yaml()?,
    };
    println!("{rendered}");
    Ok(ExitCode::SUCCESS)
}

/// Check command.
fn cmd_check(input: &Path) -> anyhow::Result<ExitCode> {
    let monitoring = load_manifest(input)?;
    let Some(exporters) = monitoring.metrics_exporters() else {
        println!("Metrics are not enabled; no custom exporters to check.");
        return Ok(ExitCode::SUCCESS);
    };

    let problems = ExporterAssembler::new().diagnose(exporters);
    if problems.is_empty() {
        println!("{} custom exporter(s) OK", exporters.len());
        return Ok(ExitCode::SUCCESS);
    }

    for problem in &problems {
        println!("  - {problem}");
    }
    println!("{} problem(s) found", problems.len());
    Ok(ExitCode::FAILURE)
}
