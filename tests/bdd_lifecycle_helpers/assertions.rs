//! Assertion steps for lifecycle harness scenarios.

use podprobe::api::CommandOutcome;
use podprobe::scenario::{RunReport, StepStatus};
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{LifecycleState, Observed};

fn observed(lifecycle_state: &LifecycleState) -> StepResult<Observed> {
    lifecycle_state
        .observed
        .get()
        .ok_or_else(|| String::from("the harness should have run"))
}

fn run_report(lifecycle_state: &LifecycleState) -> StepResult<RunReport> {
    let observed = observed(lifecycle_state)?;
    match (observed.run, observed.not_started) {
        (Some(report), _) => Ok(report),
        (None, Some(fault)) => Err(format!("scenario did not start: {fault}")),
        (None, None) => Err(String::from("scenario did not complete")),
    }
}

fn describe(report: &RunReport) -> String {
    report
        .outcomes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[then("all {count} steps pass")]
fn all_steps_pass(lifecycle_state: &LifecycleState, count: usize) -> StepResult<()> {
    let report = run_report(lifecycle_state)?;
    if report.outcomes.len() != count {
        return Err(format!(
            "expected {count} outcomes, got {}",
            report.outcomes.len()
        ));
    }
    if report.passed() {
        Ok(())
    } else {
        Err(format!("expected every step to pass:\n{}", describe(&report)))
    }
}

#[then("the {name} step fails")]
fn named_step_fails(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    let report = run_report(lifecycle_state)?;
    let outcome = report
        .outcomes
        .iter()
        .find(|outcome| outcome.name == name)
        .ok_or_else(|| format!("no step named {name}"))?;
    match outcome.status {
        StepStatus::Failed(_) => Ok(()),
        StepStatus::Passed | StepStatus::Skipped => {
            Err(format!("expected {name} to fail:\n{}", describe(&report)))
        }
    }
}

#[then("the first failure is the {name} step")]
fn first_failure_is(lifecycle_state: &LifecycleState, name: String) -> StepResult<()> {
    let report = run_report(lifecycle_state)?;
    match report.first_failure() {
        Some(outcome) if outcome.name == name => Ok(()),
        Some(outcome) => Err(format!("first failure was {}", outcome.name)),
        None => Err(String::from("no step failed")),
    }
}

#[then("the remaining {count} steps are skipped")]
fn remaining_steps_skipped(lifecycle_state: &LifecycleState, count: usize) -> StepResult<()> {
    let report = run_report(lifecycle_state)?;
    let trailing_skips = report
        .outcomes
        .iter()
        .rev()
        .take_while(|outcome| outcome.status == StepStatus::Skipped)
        .count();
    let (_, _, skipped) = report.tally();
    if trailing_skips == count && skipped == count {
        Ok(())
    } else {
        Err(format!(
            "expected the last {count} steps skipped, got {skipped}:\n{}",
            describe(&report)
        ))
    }
}

#[then("no step is skipped")]
fn no_step_skipped(lifecycle_state: &LifecycleState) -> StepResult<()> {
    let report = run_report(lifecycle_state)?;
    let (_, _, skipped) = report.tally();
    if skipped == 0 {
        Ok(())
    } else {
        Err(format!("{skipped} steps were skipped"))
    }
}

#[then("the scenario does not start")]
fn scenario_not_started(lifecycle_state: &LifecycleState) -> StepResult<()> {
    let observed = observed(lifecycle_state)?;
    match (observed.run, observed.not_started) {
        (None, Some(_)) => Ok(()),
        (Some(report), _) => Err(format!("scenario ran:\n{}", describe(&report))),
        (None, None) => Err(String::from("scenario ended without a connection fault")),
    }
}

/// Step names and verdicts, ignoring timings and captured values.
fn verdicts(report: &RunReport) -> Vec<(String, StepStatus)> {
    report
        .outcomes
        .iter()
        .map(|outcome| (outcome.name.clone(), outcome.status.clone()))
        .collect()
}

#[then("both runs report the same step results")]
fn both_runs_agree(lifecycle_state: &LifecycleState) -> StepResult<()> {
    let earlier = lifecycle_state
        .earlier_run
        .get()
        .ok_or_else(|| String::from("an earlier run should be recorded"))?
        .run
        .ok_or_else(|| String::from("the earlier run should have started"))?;
    let later = run_report(lifecycle_state)?;
    if verdicts(&earlier) == verdicts(&later) {
        Ok(())
    } else {
        Err(format!(
            "runs disagree:\n{}\n---\n{}",
            describe(&earlier),
            describe(&later)
        ))
    }
}

#[then("the outcome is success")]
fn outcome_is_success(lifecycle_state: &LifecycleState) -> StepResult<()> {
    match observed(lifecycle_state)?.outcome {
        CommandOutcome::Success => Ok(()),
        CommandOutcome::Failure => Err(String::from("expected Success, got Failure")),
    }
}

#[then("the outcome is failure")]
fn outcome_is_failure(lifecycle_state: &LifecycleState) -> StepResult<()> {
    match observed(lifecycle_state)?.outcome {
        CommandOutcome::Failure => Ok(()),
        CommandOutcome::Success => Err(String::from("expected Failure, got Success")),
    }
}

#[then("cleanup reports no faults")]
fn cleanup_clean(lifecycle_state: &LifecycleState) -> StepResult<()> {
    match observed(lifecycle_state)?.cleanup_faults {
        0 => Ok(()),
        faults => Err(format!("cleanup reported {faults} faults")),
    }
}

#[then("the engine holds no containers or images")]
fn engine_is_empty(lifecycle_state: &LifecycleState) -> StepResult<()> {
    let engine = lifecycle_state
        .engine
        .get()
        .ok_or_else(|| String::from("engine should be initialised"))?;
    let (containers, images) = (engine.container_count(), engine.image_count());
    if containers == 0 && images == 0 {
        Ok(())
    } else {
        Err(format!(
            "engine still holds {containers} containers and {images} images"
        ))
    }
}

#[then("the host CLI ran {command}")]
fn host_cli_ran(lifecycle_state: &LifecycleState, command: String) -> StepResult<()> {
    let cli = lifecycle_state
        .cli
        .get()
        .ok_or_else(|| String::from("host CLI should be initialised"))?;
    let expected: Vec<String> = command.split_whitespace().map(String::from).collect();
    let invocations = cli.invocations();
    if invocations.contains(&expected) {
        Ok(())
    } else {
        Err(format!("expected {expected:?} among {invocations:?}"))
    }
}
