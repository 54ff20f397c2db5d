//! Fixture lifecycle manager.
//!
//! Guarantees a clean engine before the scenario and after it on every exit
//! path: a failed connection, a failed step, or a panicking step all still
//! reach tear-down. Cleanup failures are logged and collected but never
//! replace the scenario's own result.

mod janitor;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

pub use janitor::{CleanupAction, CleanupFuture, CommandJanitor, EngineJanitor, Janitor};

use crate::engine::EngineClient;
use crate::error::{CleanupFault, ConnectionFault};
use crate::scenario::{RunContext, RunReport, Scenario, ScenarioRunner};

/// How far the scenario got.
#[derive(Debug)]
pub enum ScenarioResult {
    /// Every step was executed or deliberately skipped.
    Completed(RunReport),
    /// The session could not be opened; no step ran.
    NotStarted(ConnectionFault),
    /// A step panicked.
    Panicked {
        /// The panic payload message.
        message: String,
        /// Outcomes of the steps that finished before the panic.
        partial: RunReport,
    },
}

/// Scenario result plus any cleanup faults from set-up and tear-down.
#[derive(Debug)]
pub struct HarnessReport {
    /// What happened to the scenario.
    pub scenario: ScenarioResult,
    /// Cleanup failures, in the order they occurred.
    pub cleanup_faults: Vec<CleanupFault>,
}

impl HarnessReport {
    /// Returns whether the scenario completed with every step passing.
    ///
    /// Cleanup faults do not affect the verdict.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(&self.scenario, ScenarioResult::Completed(report) if report.passed())
    }

    /// Returns the step report when the scenario ran, partial after a panic.
    #[must_use]
    pub const fn run_report(&self) -> Option<&RunReport> {
        match &self.scenario {
            ScenarioResult::Completed(report)
            | ScenarioResult::Panicked {
                partial: report, ..
            } => Some(report),
            ScenarioResult::NotStarted(_) => None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"))
}

/// Wraps a scenario run in set-up and tear-down cleanup.
#[derive(Debug)]
pub struct FixtureManager<J> {
    janitor: J,
}

impl<J: Janitor> FixtureManager<J> {
    /// Manage fixtures with `janitor`.
    #[must_use]
    pub const fn new(janitor: J) -> Self {
        Self { janitor }
    }

    /// Run every cleanup action once, returning the failures.
    pub async fn clean(&self, phase: &str) -> Vec<CleanupFault> {
        let mut faults = Vec::new();
        for action in CleanupAction::SEQUENCE {
            tracing::debug!(phase, %action, "cleanup started");
            if let Err(fault) = self.janitor.perform(action).await {
                tracing::warn!(phase, %action, error = %fault, "cleanup failed");
                faults.push(fault);
            }
        }
        faults
    }

    /// Clean, open a session with `open`, run `scenario`, then clean again.
    ///
    /// The session is closed after tear-down cleanup, on every path.
    pub async fn run<C, O, Fut>(
        &self,
        open: O,
        runner: &ScenarioRunner,
        scenario: &Scenario,
    ) -> HarnessReport
    where
        C: EngineClient,
        O: FnOnce() -> Fut,
        Fut: Future<Output = Result<RunContext<C>, ConnectionFault>>,
    {
        let mut cleanup_faults = self.clean("set-up").await;

        let (scenario_result, session) = match open().await {
            Err(fault) => {
                tracing::error!(error = %fault, "could not open engine session; skipping scenario");
                (ScenarioResult::NotStarted(fault), None)
            }
            Ok(ctx) => {
                let mut report = RunReport::default();
                let outcome = AssertUnwindSafe(runner.run_into(scenario, &ctx, &mut report))
                    .catch_unwind()
                    .await;
                let result = match outcome {
                    Ok(()) => ScenarioResult::Completed(report),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(
                            panic = %message,
                            finished = report.outcomes.len(),
                            "scenario panicked"
                        );
                        ScenarioResult::Panicked {
                            message,
                            partial: report,
                        }
                    }
                };
                (result, Some(ctx))
            }
        };

        cleanup_faults.extend(self.clean("tear-down").await);
        drop(session);

        HarnessReport {
            scenario: scenario_result,
            cleanup_faults,
        }
    }
}
