//! The image and container lifecycle scenario.

use super::step::{
    Expectation, Invocation, PostCondition, ScenarioStep, SettleBudget, Target,
};
use super::{Scenario, Subjects};
use crate::engine::ContainerStatus;
use crate::remote::FaultKind;

/// Name used for lookups that must fail without a specific fault kind.
pub const UNKNOWN_NAME: &str = "somethingNotExist";

/// Name used for lookups that must fail with a not-found fault.
pub const MISSING_NAME: &str = "non-exist";

fn identifier_then(
    name: &str,
    invocation: Invocation,
    status: ContainerStatus,
    budget: SettleBudget,
) -> ScenarioStep {
    ScenarioStep::new(name, invocation, Expectation::Identifier)
        .then_probe(PostCondition::Status(status, budget))
}

/// Pull, inspect, run, pause, unpause, stop, start, and remove, then confirm
/// that lookups of missing resources fail with the right fault.
///
/// Fault markers are qualified by `interface`, e.g. `io.podman.ImageNotFound`.
#[must_use]
pub fn lifecycle_scenario(subjects: &Subjects, interface: &str) -> Scenario {
    Scenario::new([
        ScenarioStep::new("pull image", Invocation::PullImage, Expectation::Identifier),
        ScenarioStep::new(
            "list images",
            Invocation::ListImages,
            Expectation::RepoTags(vec![subjects.expected_repo_tag.clone()]),
        ),
        ScenarioStep::new(
            "get image",
            Invocation::GetImage(Target::Shared),
            Expectation::Present,
        ),
        ScenarioStep::new(
            "get unknown image",
            Invocation::GetImage(Target::Named(String::from(UNKNOWN_NAME))),
            Expectation::Fault {
                kind_contains: None,
            },
        ),
        identifier_then(
            "run container",
            Invocation::RunContainer,
            ContainerStatus::Running,
            SettleBudget::Transition,
        ),
        ScenarioStep::new(
            "list containers",
            Invocation::ListContainers,
            Expectation::FirstContainerNamed(subjects.container_name.clone()),
        ),
        ScenarioStep::new(
            "get container",
            Invocation::GetContainer(Target::Shared),
            Expectation::Present,
        ),
        ScenarioStep::new(
            "get unknown container",
            Invocation::GetContainer(Target::Named(String::from(UNKNOWN_NAME))),
            Expectation::Fault {
                kind_contains: None,
            },
        ),
        identifier_then(
            "pause container",
            Invocation::PauseContainer,
            ContainerStatus::Paused,
            SettleBudget::Transition,
        ),
        identifier_then(
            "unpause container",
            Invocation::UnpauseContainer,
            ContainerStatus::Running,
            SettleBudget::Transition,
        ),
        identifier_then(
            "stop container",
            Invocation::StopContainer,
            ContainerStatus::Exited,
            SettleBudget::Stop,
        ),
        identifier_then(
            "start container",
            Invocation::StartContainer,
            ContainerStatus::Running,
            SettleBudget::Transition,
        ),
        ScenarioStep::new(
            "force-remove container",
            Invocation::RemoveContainer { force: true },
            Expectation::Identifier,
        )
        .then_probe(PostCondition::ContainerCount(0, SettleBudget::Transition)),
        ScenarioStep::new("remove image", Invocation::RemoveImage, Expectation::Identifier)
            .then_probe(PostCondition::ImageCount(0, SettleBudget::Immediate)),
        ScenarioStep::new(
            "get missing image",
            Invocation::GetImage(Target::Named(String::from(MISSING_NAME))),
            Expectation::Fault {
                kind_contains: Some(FaultKind::ImageNotFound.qualified(interface)),
            },
        ),
        ScenarioStep::new(
            "get missing container",
            Invocation::GetContainer(Target::Named(String::from(MISSING_NAME))),
            Expectation::Fault {
                kind_contains: Some(FaultKind::ContainerNotFound.qualified(interface)),
            },
        ),
    ])
}
