//! Semantic error types for the podprobe harness.
//!
//! This module defines the error hierarchy for podprobe, following the principle
//! of using semantic error enums (via `thiserror`) for conditions the caller
//! might inspect or assert on, while reserving opaque errors (`eyre::Report`)
//! for the application boundary.
//!
//! The harness distinguishes four failure families:
//!
//! - [`ConnectionFault`]: no session with the engine could be established.
//! - [`RemoteFault`]: the engine answered a call with a named fault.
//! - [`AssertionFailure`]: an observed value or state did not match.
//! - [`CleanupFault`]: a set-up or tear-down cleanup action failed.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path given on the command line.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Failure to establish a session with the container engine.
///
/// Fatal to the whole run: no scenario step executes, but tear-down cleanup
/// still does.
#[derive(Debug, Error)]
pub enum ConnectionFault {
    /// Failed to connect to the container engine socket.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// The container engine socket was not found.
    #[error("container engine socket not found: {path}")]
    SocketNotFound {
        /// The path where the socket was expected.
        path: PathBuf,
    },

    /// Permission denied when accessing the container engine socket.
    #[error("permission denied accessing container socket: {path}")]
    PermissionDenied {
        /// The path to the socket.
        path: PathBuf,
    },

    /// Health check failed - engine did not respond correctly.
    #[error("container engine health check failed: {message}")]
    HealthCheckFailed {
        /// A description of the health check failure.
        message: String,
    },

    /// Health check timed out.
    #[error("container engine health check timed out after {seconds} seconds")]
    HealthCheckTimeout {
        /// The timeout duration in seconds.
        seconds: u64,
    },

    /// The async runtime backing synchronous helpers could not be created.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime failure.
        message: String,
    },
}

/// A named failure reported by the engine for a single call.
///
/// `kind` is the fully-qualified fault name (for example
/// `io.podman.ImageNotFound`) and is matched verbatim by assertions. `detail`
/// carries the engine's own message untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct RemoteFault {
    /// Fully-qualified fault name.
    pub kind: String,
    /// Human-readable detail as reported by the engine.
    pub detail: String,
    /// HTTP status reported by the engine, when the fault came from a response.
    pub status_code: Option<u16>,
}

impl RemoteFault {
    /// Returns whether the fault kind contains `marker`.
    #[must_use]
    pub fn kind_contains(&self, marker: &str) -> bool {
        self.kind.contains(marker)
    }
}

/// Failures of commands issued on the host's container-management CLI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostCommandError {
    /// The command could not be spawned at all.
    #[error("failed to spawn '{program}': {message}")]
    SpawnFailed {
        /// The program that was invoked.
        program: String,
        /// A description of the spawn failure.
        message: String,
    },

    /// The command ran but exited unsuccessfully.
    #[error("'{command}' exited with {code}: {stderr}")]
    NonZeroExit {
        /// The rendered command line.
        command: String,
        /// How the process exited.
        code: ExitCode,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The command succeeded but printed nothing usable.
    #[error("'{command}' produced no output")]
    EmptyOutput {
        /// The rendered command line.
        command: String,
    },
}

/// Exit code of a host command, absent when the process was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub Option<i32>);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "status {value}"),
            None => write!(f, "a signal"),
        }
    }
}

/// Failure of a single adapter call, whichever surface served it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The engine reported a fault.
    #[error(transparent)]
    Remote(#[from] RemoteFault),

    /// The host CLI fallback failed.
    #[error(transparent)]
    HostCommand(#[from] HostCommandError),
}

/// An observed value or state did not match the step's expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, observed {observed}")]
pub struct AssertionFailure {
    /// What the step expected.
    pub expected: String,
    /// What was actually observed.
    pub observed: String,
}

impl AssertionFailure {
    /// Build an assertion failure from displayable parts.
    #[must_use]
    pub fn new(expected: impl Into<String>, observed: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            observed: observed.into(),
        }
    }
}

/// Why a scenario step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepFailure {
    /// An unexpected engine fault propagated from the call or the probe.
    #[error("remote fault: {0}")]
    Remote(#[from] RemoteFault),

    /// The host CLI fallback failed.
    #[error("host command failed: {0}")]
    HostCommand(#[from] HostCommandError),

    /// The observed value did not satisfy the expectation.
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),

    /// The step exceeded its wall-clock budget.
    #[error("step timed out after {budget_ms}ms")]
    Timeout {
        /// The budget that was exceeded, in milliseconds.
        budget_ms: u128,
    },
}

impl From<CallError> for StepFailure {
    fn from(error: CallError) -> Self {
        match error {
            CallError::Remote(fault) => Self::Remote(fault),
            CallError::HostCommand(host) => Self::HostCommand(host),
        }
    }
}

/// A set-up or tear-down cleanup action failed.
///
/// Recorded and logged, never allowed to override the run's primary result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cleanup '{action}' failed: {message}")]
pub struct CleanupFault {
    /// The cleanup action that failed.
    pub action: String,
    /// A description of the failure.
    pub message: String,
}

/// Top-level error type for the podprobe application.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the application. At the application boundary (main.rs),
/// these errors are typically converted to `eyre::Report` for human-readable
/// error reporting.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No session with the engine could be established.
    #[error(transparent)]
    Connection(#[from] ConnectionFault),

    /// Logging could not be initialised.
    #[error("failed to initialise logging: {message}")]
    Logging {
        /// A description of the failure.
        message: String,
    },
}

/// A specialised `Result` type for podprobe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
