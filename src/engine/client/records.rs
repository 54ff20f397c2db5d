//! Plain records exchanged across the engine client seam.

use std::fmt;

/// Lowest-common-denominator view of a local image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRecord {
    /// Content-addressed identifier, without any `sha256:` prefix.
    pub id: String,
    /// Repository tags, fully qualified as the engine reports them.
    pub repo_tags: Vec<String>,
}

/// Lowest-common-denominator view of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    /// Content-addressed identifier.
    pub id: String,
    /// Container names with any leading `/` removed.
    pub names: Vec<String>,
    /// Image the container was created from.
    pub image: String,
    /// Lifecycle status as last reported.
    pub status: ContainerStatus,
}

impl ContainerRecord {
    /// Returns the first name, if any.
    #[must_use]
    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }
}

/// Lifecycle status of a container.
///
/// Statuses the harness never asserts on collapse into `Unknown`, so a
/// transitional state such as `stopping` is an observation, not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerStatus {
    /// Created but never started.
    Created,
    /// Running.
    Running,
    /// Frozen by a pause request.
    Paused,
    /// Stopped after running.
    Exited,
    /// Anything else the engine reports.
    #[default]
    Unknown,
}

impl ContainerStatus {
    /// Parse the engine's status string.
    ///
    /// Podman reports `configured` for never-started containers and `stopped`
    /// for some exited ones; both map onto the Docker vocabulary.
    #[must_use]
    pub fn from_engine(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "created" | "configured" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "exited" | "stopped" => Self::Exited,
            _ => Self::Unknown,
        }
    }

    /// Returns the lowercase engine spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Exited => "exited",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for creating a named container over the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Container name.
    pub name: String,
    /// Image to create from.
    pub image: String,
    /// Command to run; `None` keeps the image default.
    pub command: Option<Vec<String>>,
}
