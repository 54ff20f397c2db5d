//! Step descriptors: what each step calls, expects, and probes afterwards.

use std::fmt;

use crate::engine::{ContainerRecord, ContainerStatus, ImageRecord};

/// Which resource a lookup step addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The run's shared subject: the expected repository tag for images, the
    /// container name for containers.
    Shared,
    /// An explicit name, typically one that must not exist.
    Named(String),
}

/// The remote operation a step invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Pull the subject image.
    PullImage,
    /// List local images.
    ListImages,
    /// Look up an image.
    GetImage(Target),
    /// Remove the subject image by its short name.
    RemoveImage,
    /// Run the subject container.
    RunContainer,
    /// List containers.
    ListContainers,
    /// Look up a container.
    GetContainer(Target),
    /// Pause the subject container.
    PauseContainer,
    /// Unpause the subject container.
    UnpauseContainer,
    /// Stop the subject container.
    StopContainer,
    /// Start the subject container.
    StartContainer,
    /// Remove the subject container.
    RemoveContainer {
        /// Whether to remove it even while running.
        force: bool,
    },
}

/// Successful result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepValue {
    /// An identifier returned by a mutating call.
    Identifier(String),
    /// One image record.
    Image(ImageRecord),
    /// An image listing.
    Images(Vec<ImageRecord>),
    /// One container record.
    Container(ContainerRecord),
    /// A container listing.
    Containers(Vec<ContainerRecord>),
}

impl fmt::Display for StepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(id) => f.write_str(id),
            Self::Image(image) => write!(f, "image {} {:?}", image.id, image.repo_tags),
            Self::Images(images) => write!(f, "{} image(s)", images.len()),
            Self::Container(record) => {
                write!(f, "container {} ({})", record.id, record.status)
            }
            Self::Containers(records) => write!(f, "{} container(s)", records.len()),
        }
    }
}

/// What the invocation's outcome must look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Success with a 64-character hexadecimal identifier.
    Identifier,
    /// Success with the first listed image carrying exactly these tags.
    RepoTags(Vec<String>),
    /// Success with the first listed container carrying this name.
    FirstContainerNamed(String),
    /// Any success.
    Present,
    /// A remote fault, optionally with a kind containing the given marker.
    Fault {
        /// Required substring of the fault kind.
        kind_contains: Option<String>,
    },
}

/// Which settle budget a post-condition polls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleBudget {
    /// Pause, unpause, start, and removal transitions.
    Transition,
    /// Stop transitions, which may wait out a grace period.
    Stop,
    /// A single observation.
    Immediate,
}

/// State that must hold once the invocation has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCondition {
    /// The subject container reports this status.
    Status(ContainerStatus, SettleBudget),
    /// The engine holds exactly this many containers.
    ContainerCount(usize, SettleBudget),
    /// The engine holds exactly this many images.
    ImageCount(usize, SettleBudget),
}

impl PostCondition {
    /// Returns the budget the condition polls under.
    #[must_use]
    pub const fn budget(self) -> SettleBudget {
        match self {
            Self::Status(_, budget)
            | Self::ContainerCount(_, budget)
            | Self::ImageCount(_, budget) => budget,
        }
    }
}

/// One named, ordered step of a scenario.
///
/// The ordinal is assigned when the step joins a [`super::Scenario`] and is
/// its 1-based position there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioStep {
    pub(super) ordinal: usize,
    name: String,
    invocation: Invocation,
    expectation: Expectation,
    post_condition: Option<PostCondition>,
}

impl ScenarioStep {
    /// Declare a step without a post-condition.
    #[must_use]
    pub fn new(name: impl Into<String>, invocation: Invocation, expectation: Expectation) -> Self {
        Self {
            ordinal: 0,
            name: name.into(),
            invocation,
            expectation,
            post_condition: None,
        }
    }

    /// Attach a post-condition checked after the expectation holds.
    #[must_use]
    pub const fn then_probe(mut self, condition: PostCondition) -> Self {
        self.post_condition = Some(condition);
        self
    }

    /// Returns the 1-based position in the scenario.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Returns the step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the invocation.
    #[must_use]
    pub const fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Returns the expectation.
    #[must_use]
    pub const fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    /// Returns the post-condition, if any.
    #[must_use]
    pub const fn post_condition(&self) -> Option<PostCondition> {
        self.post_condition
    }
}
