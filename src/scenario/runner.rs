//! Sequential execution of scenario steps.

use std::time::Duration;

use tokio::time::Instant;

use super::report::{Outcome, RunReport, StepStatus};
use super::step::{Expectation, Invocation, PostCondition, ScenarioStep, StepValue, Target};
use super::{RunContext, Scenario};
use crate::engine::EngineClient;
use crate::error::{AssertionFailure, CallError, StepFailure};
use crate::probe::Settled;

/// Length of a content-addressed identifier in hexadecimal characters.
pub const IDENTIFIER_LEN: usize = 64;

/// What happens to the remaining steps after one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Skip every later step; they depend on state the failed step owed them.
    #[default]
    Abort,
    /// Execute every step regardless.
    Continue,
}

/// Executes a [`Scenario`] step by step against a [`RunContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioRunner {
    step_timeout: Duration,
    policy: FailurePolicy,
}

impl ScenarioRunner {
    /// Build a runner with a per-step wall-clock budget.
    #[must_use]
    pub const fn new(step_timeout: Duration, policy: FailurePolicy) -> Self {
        Self {
            step_timeout,
            policy,
        }
    }

    /// Returns the failure policy.
    #[must_use]
    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run every step in ordinal order and collect one outcome per step.
    pub async fn run<C: EngineClient>(&self, scenario: &Scenario, ctx: &RunContext<C>) -> RunReport {
        let mut report = RunReport::default();
        self.run_into(scenario, ctx, &mut report).await;
        report
    }

    /// Run every step, appending each outcome to `report` as soon as it is
    /// known.
    ///
    /// Outcomes already appended survive if a later step panics.
    pub async fn run_into<C: EngineClient>(
        &self,
        scenario: &Scenario,
        ctx: &RunContext<C>,
        report: &mut RunReport,
    ) {
        let mut aborted = false;

        for step in scenario.steps() {
            if aborted {
                tracing::info!(ordinal = step.ordinal(), step = step.name(), "step skipped");
                report
                    .outcomes
                    .push(Outcome::skipped(step.ordinal(), step.name()));
                continue;
            }

            let outcome = self.run_step(step, ctx).await;
            if !outcome.passed() && self.policy == FailurePolicy::Abort {
                aborted = true;
            }
            report.outcomes.push(outcome);
        }
    }

    async fn run_step<C: EngineClient>(&self, step: &ScenarioStep, ctx: &RunContext<C>) -> Outcome {
        tracing::info!(ordinal = step.ordinal(), step = step.name(), "step started");
        let started = Instant::now();

        let mut captured = None;
        let verdict = tokio::time::timeout(self.step_timeout, execute(step, ctx, &mut captured))
            .await
            .unwrap_or_else(|_| {
                Err(StepFailure::Timeout {
                    budget_ms: self.step_timeout.as_millis(),
                })
            });
        let elapsed = started.elapsed();

        let status = match verdict {
            Ok(()) => {
                tracing::info!(
                    ordinal = step.ordinal(),
                    step = step.name(),
                    elapsed_ms = elapsed.as_millis(),
                    "step passed"
                );
                StepStatus::Passed
            }
            Err(failure) => {
                tracing::info!(
                    ordinal = step.ordinal(),
                    step = step.name(),
                    elapsed_ms = elapsed.as_millis(),
                    error = %failure,
                    "step failed"
                );
                StepStatus::Failed(failure)
            }
        };

        Outcome {
            ordinal: step.ordinal(),
            name: step.name().to_owned(),
            status,
            captured,
            elapsed,
        }
    }
}

/// Invoke, judge, and probe one step.
///
/// The rendered invocation result lands in `captured` before the
/// post-condition is polled, so a step that times out while settling keeps it.
async fn execute<C: EngineClient>(
    step: &ScenarioStep,
    ctx: &RunContext<C>,
    captured: &mut Option<String>,
) -> Result<(), StepFailure> {
    let result = invoke(step.invocation(), ctx).await;
    *captured = Some(match &result {
        Ok(value) => value.to_string(),
        Err(error) => error.to_string(),
    });

    check_expectation(step.expectation(), result)?;
    match step.post_condition() {
        Some(condition) => check_post_condition(condition, ctx).await,
        None => Ok(()),
    }
}

async fn invoke<C: EngineClient>(
    invocation: &Invocation,
    ctx: &RunContext<C>,
) -> Result<StepValue, CallError> {
    let remote = ctx.remote();
    let subjects = ctx.subjects();
    let container = subjects.container_name.as_str();

    let value = match invocation {
        Invocation::PullImage => StepValue::Identifier(remote.pull_image(&subjects.image).await?),
        Invocation::ListImages => StepValue::Images(remote.list_images().await?),
        Invocation::GetImage(target) => {
            let reference = match target {
                Target::Shared => subjects.expected_repo_tag.as_str(),
                Target::Named(name) => name.as_str(),
            };
            StepValue::Image(remote.get_image(reference).await?)
        }
        Invocation::RemoveImage => {
            StepValue::Identifier(remote.remove_image(&subjects.image_name, false).await?)
        }
        Invocation::RunContainer => {
            StepValue::Identifier(remote.run_container(&subjects.container_spec()).await?)
        }
        Invocation::ListContainers => StepValue::Containers(remote.list_containers().await?),
        Invocation::GetContainer(target) => {
            let name = match target {
                Target::Shared => container,
                Target::Named(name) => name.as_str(),
            };
            StepValue::Container(remote.get_container(name).await?)
        }
        Invocation::PauseContainer => StepValue::Identifier(remote.pause_container(container).await?),
        Invocation::UnpauseContainer => {
            StepValue::Identifier(remote.unpause_container(container).await?)
        }
        Invocation::StopContainer => StepValue::Identifier(
            remote
                .stop_container(container, ctx.timings().stop_grace_secs)
                .await?,
        ),
        Invocation::StartContainer => StepValue::Identifier(remote.start_container(container).await?),
        Invocation::RemoveContainer { force } => {
            StepValue::Identifier(remote.remove_container(container, *force).await?)
        }
    };
    Ok(value)
}

/// Returns whether `id` is a content-addressed identifier.
#[must_use]
pub fn is_identifier(id: &str) -> bool {
    id.len() == IDENTIFIER_LEN && id.bytes().all(|byte| byte.is_ascii_hexdigit())
}

/// Judge an invocation result against its expectation.
///
/// # Errors
///
/// Returns an [`AssertionFailure`] when the shape is wrong, or the call's own
/// error when a success was expected.
pub fn check_expectation(
    expectation: &Expectation,
    result: Result<StepValue, CallError>,
) -> Result<(), StepFailure> {
    match (expectation, result) {
        (Expectation::Fault { kind_contains }, Err(CallError::Remote(fault))) => {
            match kind_contains {
                Some(marker) if !fault.kind_contains(marker) => Err(AssertionFailure::new(
                    format!("fault kind containing '{marker}'"),
                    format!("fault kind '{}'", fault.kind),
                )
                .into()),
                _ => Ok(()),
            }
        }
        (Expectation::Fault { .. }, Ok(value)) => {
            Err(AssertionFailure::new("a remote fault", format!("success: {value}")).into())
        }
        (_, Err(error)) => Err(error.into()),
        (Expectation::Present, Ok(_)) => Ok(()),
        (Expectation::Identifier, Ok(StepValue::Identifier(id))) => {
            if is_identifier(&id) {
                Ok(())
            } else {
                Err(AssertionFailure::new(
                    format!("a {IDENTIFIER_LEN}-character hex identifier"),
                    format!("'{id}' ({} characters)", id.chars().count()),
                )
                .into())
            }
        }
        (Expectation::RepoTags(expected), Ok(StepValue::Images(images))) => {
            let observed = images.first().map(|image| image.repo_tags.clone());
            if observed.as_ref() == Some(expected) {
                Ok(())
            } else {
                Err(AssertionFailure::new(
                    format!("first image tagged {expected:?}"),
                    observed.map_or_else(
                        || String::from("no images"),
                        |tags| format!("first image tagged {tags:?}"),
                    ),
                )
                .into())
            }
        }
        (Expectation::FirstContainerNamed(expected), Ok(StepValue::Containers(records))) => {
            let first = records.first();
            if first.is_some_and(|record| record.names.iter().any(|name| name == expected)) {
                Ok(())
            } else {
                Err(AssertionFailure::new(
                    format!("first container named '{expected}'"),
                    first.map_or_else(
                        || String::from("no containers"),
                        |record| format!("first container named {:?}", record.names),
                    ),
                )
                .into())
            }
        }
        (expectation, Ok(value)) => Err(AssertionFailure::new(
            format!("{expectation:?}"),
            format!("unrelated value: {value}"),
        )
        .into()),
    }
}

async fn check_post_condition<C: EngineClient>(
    condition: PostCondition,
    ctx: &RunContext<C>,
) -> Result<(), StepFailure> {
    let policy = ctx.timings().policy(condition.budget());
    let prober = ctx.prober();

    let (expected, settled) = match condition {
        PostCondition::Status(expected, _) => {
            let observed = prober
                .settle_status(&ctx.subjects().container_name, expected, policy)
                .await?;
            (
                format!("status '{expected}'"),
                observed.map(|status| format!("status '{status}'")),
            )
        }
        PostCondition::ContainerCount(expected, _) => {
            let observed = prober.settle_container_count(expected, policy).await?;
            (
                format!("{expected} container(s)"),
                observed.map(|count| format!("{count} container(s)")),
            )
        }
        PostCondition::ImageCount(expected, _) => {
            let observed = prober.settle_image_count(expected, policy).await?;
            (
                format!("{expected} image(s)"),
                observed.map(|count| format!("{count} image(s)")),
            )
        }
    };

    match settled {
        Settled::Reached(_) => Ok(()),
        Settled::TimedOut(last) => Err(AssertionFailure::new(
            expected,
            format!("{last} after {}ms", policy.timeout.as_millis()),
        )
        .into()),
    }
}
