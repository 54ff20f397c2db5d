//! Translation of client errors into named remote faults.

use bollard::errors::Error as BollardError;

use super::operation::{Operation, ResourceCategory};
use crate::error::RemoteFault;

/// Fault families the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The named image does not exist.
    ImageNotFound,
    /// The named container does not exist.
    ContainerNotFound,
    /// The resource is not in a state that permits the request.
    InvalidState,
    /// The engine reported some other failure.
    ErrorOccurred,
    /// No engine response was obtained at all.
    RuntimeError,
}

impl FaultKind {
    /// Returns the unqualified fault name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ImageNotFound => "ImageNotFound",
            Self::ContainerNotFound => "ContainerNotFound",
            Self::InvalidState => "InvalidState",
            Self::ErrorOccurred => "ErrorOccurred",
            Self::RuntimeError => "RuntimeError",
        }
    }

    /// Returns the fault name qualified by `interface`.
    #[must_use]
    pub fn qualified(self, interface: &str) -> String {
        format!("{interface}.{}", self.name())
    }

    /// Derive the fault family from an HTTP status and the operation's target.
    #[must_use]
    pub const fn from_status(status_code: u16, category: ResourceCategory) -> Self {
        match (status_code, category) {
            (404, ResourceCategory::Image) => Self::ImageNotFound,
            (404, ResourceCategory::Container) => Self::ContainerNotFound,
            (304 | 409, _) => Self::InvalidState,
            _ => Self::ErrorOccurred,
        }
    }
}

/// Build the [`RemoteFault`] for a failed `operation`.
///
/// The engine's message is kept verbatim, including errors it reports
/// mid-stream; transport failures keep the client's own rendering.
#[must_use]
pub fn classify(interface: &str, operation: Operation, error: &BollardError) -> RemoteFault {
    match error {
        BollardError::DockerResponseServerError {
            status_code,
            message,
        } => RemoteFault {
            kind: FaultKind::from_status(*status_code, operation.category()).qualified(interface),
            detail: message.clone(),
            status_code: Some(*status_code),
        },
        BollardError::DockerStreamError { error: message } => RemoteFault {
            kind: FaultKind::ErrorOccurred.qualified(interface),
            detail: message.clone(),
            status_code: None,
        },
        other => RemoteFault {
            kind: FaultKind::RuntimeError.qualified(interface),
            detail: other.to_string(),
            status_code: None,
        },
    }
}
