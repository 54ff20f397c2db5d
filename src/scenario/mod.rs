//! Sequential scenario runner.
//!
//! A [`Scenario`] is an explicit, ordered list of [`ScenarioStep`]s. Steps are
//! coupled through engine state: each one relies on what the previous one
//! left behind, so ordering is declared here rather than implied by names,
//! and the [`ScenarioRunner`] aborts the remainder after the first failure
//! unless told otherwise.
//!
//! The [`RunContext`] carries the open session and the fixed subjects every
//! step shares: one image and one container name, mutated in place across the
//! whole run.

mod lifecycle;
mod report;
mod runner;
mod step;

use std::time::Duration;

pub use lifecycle::{MISSING_NAME, UNKNOWN_NAME, lifecycle_scenario};
pub use report::{Outcome, RunReport, StepStatus};
pub use runner::{FailurePolicy, IDENTIFIER_LEN, ScenarioRunner, check_expectation, is_identifier};
pub use step::{
    Expectation, Invocation, PostCondition, ScenarioStep, SettleBudget, StepValue, Target,
};

use crate::engine::{ContainerSpec, EngineClient};
use crate::probe::{SettlePolicy, StateProber};
use crate::remote::RemoteAdapter;

/// An ordered list of steps with stable ordinals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Fix the order of `steps`, numbering them from 1.
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = ScenarioStep>) -> Self {
        let numbered = steps
            .into_iter()
            .zip(1..)
            .map(|(mut step, ordinal)| {
                step.ordinal = ordinal;
                step
            })
            .collect();
        Self { steps: numbered }
    }

    /// Returns the steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }

    /// Returns the number of steps.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether the scenario has no steps.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The fixed resources shared by every step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects {
    /// Reference pulled at the start, e.g. `alpine:latest`.
    pub image: String,
    /// Short name used to run and remove the image, e.g. `alpine`.
    pub image_name: String,
    /// Fully-qualified tag the engine reports after the pull.
    pub expected_repo_tag: String,
    /// Name of the one container the run creates.
    pub container_name: String,
    /// Long-running command the container executes.
    pub container_command: Vec<String>,
}

impl Subjects {
    /// Returns the creation parameters for the shared container.
    #[must_use]
    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            name: self.container_name.clone(),
            image: self.image_name.clone(),
            command: (!self.container_command.is_empty()).then(|| self.container_command.clone()),
        }
    }

    /// Target `reference` instead, deriving the run name and the expected
    /// repository tag from it.
    ///
    /// `busybox:1.36` runs as `busybox:1.36` and is expected back as
    /// `docker.io/library/busybox:1.36`; `alpine:latest` runs as `alpine`.
    #[must_use]
    pub fn with_image(self, reference: &str) -> Self {
        let (repository, tag) = split_tag(reference);
        Self {
            image: reference.to_owned(),
            image_name: if tag == DEFAULT_TAG {
                repository.to_owned()
            } else {
                reference.to_owned()
            },
            expected_repo_tag: format!("{}:{tag}", qualify_repository(repository)),
            ..self
        }
    }
}

const DEFAULT_TAG: &str = "latest";
const DEFAULT_REGISTRY: &str = "docker.io";

/// Split `reference` into repository and tag; a colon inside a registry
/// host:port is not a tag separator.
fn split_tag(reference: &str) -> (&str, &str) {
    match reference.rsplit_once(':') {
        Some((repository, tag)) if !tag.contains('/') => (repository, tag),
        _ => (reference, DEFAULT_TAG),
    }
}

/// Prefix the default registry, and `library/` for official images, unless
/// the first path component already names a registry.
fn qualify_repository(repository: &str) -> String {
    match repository.split_once('/') {
        Some((host, _)) if host.contains(['.', ':']) || host == "localhost" => {
            repository.to_owned()
        }
        Some(_) => format!("{DEFAULT_REGISTRY}/{repository}"),
        None => format!("{DEFAULT_REGISTRY}/library/{repository}"),
    }
}

impl Default for Subjects {
    fn default() -> Self {
        Self {
            image: String::from("alpine:latest"),
            image_name: String::from("alpine"),
            expected_repo_tag: String::from("docker.io/library/alpine:latest"),
            container_name: String::from("test"),
            container_command: vec![String::from("/usr/bin/top")],
        }
    }
}

/// Settle budgets and stop grace for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimings {
    /// Budget for pause, unpause, start, and removal to become visible.
    pub transition: Duration,
    /// Budget for a stop to become visible.
    pub stop: Duration,
    /// Delay between observations.
    pub poll_interval: Duration,
    /// Seconds the engine waits before killing a stopping container.
    pub stop_grace_secs: i32,
}

impl SettleTimings {
    /// Returns the polling policy for `budget`.
    #[must_use]
    pub const fn policy(&self, budget: SettleBudget) -> SettlePolicy {
        match budget {
            SettleBudget::Transition => SettlePolicy::new(self.transition, self.poll_interval),
            SettleBudget::Stop => SettlePolicy::new(self.stop, self.poll_interval),
            SettleBudget::Immediate => SettlePolicy::immediate(),
        }
    }
}

impl Default for SettleTimings {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(3000),
            stop: Duration::from_millis(10_000),
            poll_interval: Duration::from_millis(250),
            stop_grace_secs: 10,
        }
    }
}

/// Open session plus shared subjects, owned by one run.
#[derive(Debug)]
pub struct RunContext<C> {
    remote: RemoteAdapter<C>,
    subjects: Subjects,
    timings: SettleTimings,
}

impl<C: EngineClient> RunContext<C> {
    /// Bundle an open adapter with the run's subjects and timings.
    #[must_use]
    pub const fn new(remote: RemoteAdapter<C>, subjects: Subjects, timings: SettleTimings) -> Self {
        Self {
            remote,
            subjects,
            timings,
        }
    }

    /// Returns the remote adapter.
    #[must_use]
    pub const fn remote(&self) -> &RemoteAdapter<C> {
        &self.remote
    }

    /// Returns the shared subjects.
    #[must_use]
    pub const fn subjects(&self) -> &Subjects {
        &self.subjects
    }

    /// Returns the settle timings.
    #[must_use]
    pub const fn timings(&self) -> &SettleTimings {
        &self.timings
    }

    /// Returns a prober over this context's session.
    #[must_use]
    pub const fn prober(&self) -> StateProber<'_, C> {
        StateProber::new(&self.remote)
    }
}
