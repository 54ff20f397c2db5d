//! `podprobe` application entry point.
//!
//! This binary runs the container engine lifecycle harness. It uses `eyre`
//! for opaque error handling at the application boundary, converting
//! domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/podprobe/config.toml` or path from `PODPROBE_CONFIG_PATH`)
//! 3. Environment variables (`PODPROBE_*`)
//! 4. Command-line arguments

use std::process::ExitCode;

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use mockable::DefaultEnv;
use podprobe::api::{self, CommandOutcome};
use podprobe::config::{AppConfig, Cli, Commands, load_config};
use podprobe::engine::EngineConnector;
use podprobe::error::{CleanupFault, Result as ProbeResult};
use podprobe::fixture::{HarnessReport, ScenarioResult};
use podprobe::logging::init_tracing;
use podprobe::scenario::{RunReport, Scenario};

/// Application entry point.
///
/// Loads configuration, installs the tracing subscriber, then dispatches to
/// the subcommand handler on a fresh tokio runtime. The process exits with
/// status 1 when any scenario step fails.
fn main() -> EyreResult<ExitCode> {
    // Parse CLI first (for subcommand dispatch and global options).
    let cli = Cli::parse();

    // Load configuration with layered precedence: defaults < file < env < CLI.
    let config = load_config(&cli).map_err(Report::from)?;
    init_tracing(&config.logging).map_err(Report::from)?;

    let runtime = EngineConnector::create_runtime().map_err(Report::from)?;
    let outcome = runtime
        .block_on(run(&cli, &config))
        .map_err(Report::from)?;
    Ok(ExitCode::from(outcome.exit_code()))
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
async fn run(cli: &Cli, config: &AppConfig) -> ProbeResult<CommandOutcome> {
    let env = DefaultEnv::new();
    match &cli.command {
        Commands::Run(_) => {
            let report = api::run_lifecycle(config, &env).await?;
            print_report(&report);
            Ok(CommandOutcome::from_report(&report))
        }
        Commands::Steps => {
            print_steps(&api::describe_steps(config)?);
            Ok(CommandOutcome::Success)
        }
        Commands::Clean => {
            let faults = api::clean(config, &env).await?;
            print_cleanup_faults(&faults);
            Ok(if faults.is_empty() {
                CommandOutcome::Success
            } else {
                CommandOutcome::Failure
            })
        }
    }
}

/// Print the verbose per-step report and the final summary.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_report(report: &HarnessReport) {
    match &report.scenario {
        ScenarioResult::Completed(run) => print_outcomes(run),
        ScenarioResult::NotStarted(fault) => {
            println!("engine session could not be opened: {fault}");
            println!("no steps were run");
        }
        ScenarioResult::Panicked { message, partial } => {
            print_outcomes(partial);
            println!("scenario aborted by a panic: {message}");
        }
    }
    print_cleanup_faults(&report.cleanup_faults);
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_outcomes(run: &RunReport) {
    for outcome in &run.outcomes {
        println!("{outcome}");
        if let Some(captured) = outcome.captured.as_deref() {
            println!("     -> {captured}");
        }
    }
    let (passed, failed, skipped) = run.tally();
    println!();
    println!("{passed} passed, {failed} failed, {skipped} skipped");
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_cleanup_faults(faults: &[CleanupFault]) {
    for fault in faults {
        println!("warning: {fault}");
    }
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_steps(scenario: &Scenario) {
    for step in scenario.steps() {
        println!("[{:>2}] {}", step.ordinal(), step.name());
    }
}
