//! Named remote operations and their fully-qualified method names.

use std::fmt;

/// Resource family an operation acts on; decides which not-found fault applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    /// Images.
    Image,
    /// Containers.
    Container,
    /// Collection queries that cannot miss a single resource.
    Listing,
}

/// A remote capability of the engine's management interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Pull an image from its registry.
    PullImage,
    /// List local images.
    ListImages,
    /// Inspect one image.
    GetImage,
    /// Remove one image.
    RemoveImage,
    /// Create a named container.
    CreateContainer,
    /// Start a container.
    StartContainer,
    /// Inspect one container.
    GetContainer,
    /// List all containers.
    ListContainers,
    /// Freeze a container.
    PauseContainer,
    /// Thaw a container.
    UnpauseContainer,
    /// Stop a container.
    StopContainer,
    /// Remove a container.
    RemoveContainer,
}

impl Operation {
    /// Returns the unqualified method name.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::PullImage => "PullImage",
            Self::ListImages => "ListImages",
            Self::GetImage => "GetImage",
            Self::RemoveImage => "RemoveImage",
            Self::CreateContainer => "CreateContainer",
            Self::StartContainer => "StartContainer",
            Self::GetContainer => "GetContainer",
            Self::ListContainers => "ListContainers",
            Self::PauseContainer => "PauseContainer",
            Self::UnpauseContainer => "UnpauseContainer",
            Self::StopContainer => "StopContainer",
            Self::RemoveContainer => "RemoveContainer",
        }
    }

    /// Returns the method name qualified by `interface`, e.g. `io.podman.GetImage`.
    #[must_use]
    pub fn qualified(self, interface: &str) -> String {
        format!("{interface}.{}", self.method_name())
    }

    /// Returns the resource family the operation targets.
    ///
    /// Container creation is classed with images: a 404 there means the
    /// source image is missing.
    #[must_use]
    pub const fn category(self) -> ResourceCategory {
        match self {
            Self::PullImage | Self::GetImage | Self::RemoveImage | Self::CreateContainer => {
                ResourceCategory::Image
            }
            Self::ListImages | Self::ListContainers => ResourceCategory::Listing,
            Self::StartContainer
            | Self::GetContainer
            | Self::PauseContainer
            | Self::UnpauseContainer
            | Self::StopContainer
            | Self::RemoveContainer => ResourceCategory::Container,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}
