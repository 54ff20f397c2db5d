//! Per-step outcomes and the run summary.

use std::fmt;
use std::time::Duration;

use crate::error::StepFailure;

/// Verdict for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Expectation and post-condition held.
    Passed,
    /// The step failed.
    Failed(StepFailure),
    /// Not executed because an earlier step failed.
    Skipped,
}

/// Result record for one step, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// 1-based step position.
    pub ordinal: usize,
    /// Step name.
    pub name: String,
    /// Verdict.
    pub status: StepStatus,
    /// Rendered value or fault the invocation produced, if it ran.
    pub captured: Option<String>,
    /// Wall-clock time spent on the step.
    pub elapsed: Duration,
}

impl Outcome {
    /// Record a step that never ran.
    #[must_use]
    pub fn skipped(ordinal: usize, name: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            status: StepStatus::Skipped,
            captured: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Returns whether the step passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.status, StepStatus::Passed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.status {
            StepStatus::Passed => "ok",
            StepStatus::Failed(_) => "FAILED",
            StepStatus::Skipped => "skipped",
        };
        write!(
            f,
            "[{:>2}] {} ... {label} ({}ms)",
            self.ordinal,
            self.name,
            self.elapsed.as_millis()
        )?;
        if let StepStatus::Failed(failure) = &self.status {
            write!(f, "\n     {failure}")?;
        }
        Ok(())
    }
}

/// Ordered outcomes of one scenario run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Outcomes in step order, one per declared step.
    pub outcomes: Vec<Outcome>,
}

impl RunReport {
    /// Returns whether every step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(Outcome::passed)
    }

    /// Counts outcomes as `(passed, failed, skipped)`.
    #[must_use]
    pub fn tally(&self) -> (usize, usize, usize) {
        self.outcomes
            .iter()
            .fold((0, 0, 0), |(passed, failed, skipped), outcome| {
                match outcome.status {
                    StepStatus::Passed => (passed + 1, failed, skipped),
                    StepStatus::Failed(_) => (passed, failed + 1, skipped),
                    StepStatus::Skipped => (passed, failed, skipped + 1),
                }
            })
    }

    /// Returns the first failed outcome, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|outcome| matches!(outcome.status, StepStatus::Failed(_)))
    }
}
