//! Orchestration API for podprobe commands.
//!
//! This module turns a loaded [`AppConfig`] into a runnable harness and
//! exposes one function per CLI command: [`run_lifecycle`], [`describe_steps`],
//! and [`clean`]. These functions accept library-owned types (not clap types)
//! and never print to stdout/stderr or call `std::process::exit`; the binary
//! maps their results to output and a process exit code.

use std::future::Future;
use std::sync::Arc;

use crate::config::{AppConfig, CleanupStrategy};
use crate::engine::{EngineClient, EngineConnector, SocketResolver};
use crate::error::{CleanupFault, ConfigError, ConnectionFault, Result as ProbeResult};
use crate::fixture::{CommandJanitor, EngineJanitor, FixtureManager, HarnessReport, Janitor};
use crate::host::{CommandRunner, SystemCommandRunner};
use crate::remote::{RemoteAdapter, RunPath};
use crate::scenario::{
    FailurePolicy, RunContext, Scenario, ScenarioRunner, SettleTimings, Subjects,
    lifecycle_scenario,
};

/// Outcome of a podprobe command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Every step passed (exit code 0).
    Success,
    /// A step failed, the session never opened, or a step panicked (exit code 1).
    Failure,
}

impl CommandOutcome {
    /// Derive the outcome from a finished harness run.
    #[must_use]
    pub fn from_report(report: &HarnessReport) -> Self {
        if report.passed() {
            Self::Success
        } else {
            Self::Failure
        }
    }

    /// Returns the process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// Everything needed to run the lifecycle scenario, minus the engine session.
///
/// Built once from configuration; [`HarnessPlan::execute`] then accepts any
/// session opener, so tests drive the same plan against an in-memory engine.
#[derive(Debug, Clone)]
pub struct HarnessPlan {
    interface: String,
    subjects: Subjects,
    timings: SettleTimings,
    run_path: RunPath,
    runner: ScenarioRunner,
    scenario: Scenario,
}

impl HarnessPlan {
    /// Build the plan described by `config`.
    ///
    /// `commands` backs the host CLI run path when `runner.run_via_cli` is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `config` fails validation.
    pub fn from_config(config: &AppConfig, commands: Arc<dyn CommandRunner>) -> ProbeResult<Self> {
        config.validate()?;

        let subjects = subjects_from(config);
        let timings = timings_from(config)?;
        let run_path = if config.runner.run_via_cli {
            RunPath::HostCli {
                runner: commands,
                program: config.host.program.clone(),
            }
        } else {
            RunPath::Protocol
        };
        let policy = if config.runner.continue_on_failure {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        };
        let interface = config.interface().to_owned();
        let scenario = lifecycle_scenario(&subjects, &interface);

        Ok(Self {
            interface,
            subjects,
            timings,
            run_path,
            runner: ScenarioRunner::new(config.runner.step_timeout(), policy),
            scenario,
        })
    }

    /// Returns the ordered steps this plan runs.
    #[must_use]
    pub const fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Returns the shared resources the scenario targets.
    #[must_use]
    pub const fn subjects(&self) -> &Subjects {
        &self.subjects
    }

    /// Run the scenario inside fixture cleanup, opening a session with `connect`.
    pub async fn execute<C, J, O, Fut>(
        &self,
        fixtures: &FixtureManager<J>,
        connect: O,
    ) -> HarnessReport
    where
        C: EngineClient,
        J: Janitor,
        O: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, ConnectionFault>>,
    {
        let open = || async move {
            let client = connect().await?;
            let remote = RemoteAdapter::new(client, self.interface.clone(), self.run_path.clone());
            Ok(RunContext::new(remote, self.subjects.clone(), self.timings))
        };
        fixtures.run(open, &self.runner, &self.scenario).await
    }
}

/// Subjects from the `[subjects]` section; a top-level `image` override also
/// replaces the run name and expected tag.
fn subjects_from(config: &AppConfig) -> Subjects {
    let subjects = &config.subjects;
    let configured = Subjects {
        image: subjects.image.clone(),
        image_name: subjects.image_name.clone(),
        expected_repo_tag: subjects.expected_repo_tag.clone(),
        container_name: subjects.container_name.clone(),
        container_command: subjects.container_command.clone(),
    };
    if let Some(reference) = config.image.as_deref() {
        return configured.with_image(reference);
    }
    configured
}

fn timings_from(config: &AppConfig) -> ProbeResult<SettleTimings> {
    let settle = &config.settle;
    let stop_grace_secs =
        i32::try_from(settle.stop_grace_secs).map_err(|_| ConfigError::InvalidValue {
            field: String::from("settle.stop_grace_secs"),
            reason: String::from("is too large"),
        })?;
    Ok(SettleTimings {
        transition: settle.transition_timeout(),
        stop: settle.stop_timeout(),
        poll_interval: settle.poll_interval(),
        stop_grace_secs,
    })
}

/// Select the janitor for `config.cleanup.strategy`.
///
/// The engine strategy falls back to the host CLI when no client can be
/// opened, so cleanup still runs against an unreachable socket.
#[must_use]
pub fn janitor_for<E: mockable::Env>(
    config: &AppConfig,
    commands: &Arc<dyn CommandRunner>,
    env: &E,
) -> Box<dyn Janitor> {
    let cli = || -> Box<dyn Janitor> {
        Box::new(CommandJanitor::new(
            Arc::clone(commands),
            config.host.program.clone(),
        ))
    };

    match config.cleanup.strategy {
        CleanupStrategy::Cli => cli(),
        CleanupStrategy::Engine => {
            let resolver = SocketResolver::new(env);
            let socket = resolver.resolve(config.engine_socket.as_deref());
            match EngineConnector::connect(&socket) {
                Ok(docker) => Box::new(EngineJanitor::new(docker)),
                Err(error) => {
                    tracing::warn!(%socket, %error, "engine cleanup unavailable; using host CLI");
                    cli()
                }
            }
        }
    }
}

/// Run the full lifecycle scenario against the configured engine.
///
/// The returned report carries the scenario verdict; connection faults
/// surface as [`crate::fixture::ScenarioResult::NotStarted`] rather than as
/// an error, because cleanup still runs around them.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when `config` fails validation.
pub async fn run_lifecycle<E: mockable::Env>(
    config: &AppConfig,
    env: &E,
) -> ProbeResult<HarnessReport> {
    let commands: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
    let plan = HarnessPlan::from_config(config, Arc::clone(&commands))?;
    let fixtures = FixtureManager::new(janitor_for(config, &commands, env));
    let resolver = SocketResolver::new(env);

    tracing::info!(
        interface = %plan.interface,
        steps = plan.scenario.len(),
        "starting lifecycle scenario"
    );
    let report = plan
        .execute(&fixtures, || {
            EngineConnector::connect_with_fallback_and_verify_async(
                config.engine_socket.as_deref(),
                &resolver,
            )
        })
        .await;
    Ok(report)
}

/// Returns the scenario `run` would execute, without touching the engine.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when `config` fails validation.
pub fn describe_steps(config: &AppConfig) -> ProbeResult<Scenario> {
    let plan = HarnessPlan::from_config(config, Arc::new(SystemCommandRunner))?;
    Ok(plan.scenario)
}

/// Run one cleanup pass outside a scenario.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when `config` fails validation.
pub async fn clean<E: mockable::Env>(config: &AppConfig, env: &E) -> ProbeResult<Vec<CleanupFault>> {
    config.validate()?;
    let commands: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
    let fixtures = FixtureManager::new(janitor_for(config, &commands, env));
    Ok(fixtures.clean("manual").await)
}
