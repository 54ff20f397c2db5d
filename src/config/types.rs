//! Configuration data types for podprobe.

use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::error::ConfigError;
use crate::remote::DEFAULT_INTERFACE;

/// The resources every step of the lifecycle scenario shares.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct SubjectsConfig {
    /// Image reference pulled at the start of the run.
    #[default = "alpine:latest"]
    pub image: String,

    /// Short image name used to run and remove the image.
    #[default = "alpine"]
    pub image_name: String,

    /// Fully-qualified tag the engine is expected to report after the pull.
    #[default = "docker.io/library/alpine:latest"]
    pub expected_repo_tag: String,

    /// Name of the container the run creates.
    #[default = "test"]
    pub container_name: String,

    /// Long-running command the container executes.
    #[default(_code = "vec![String::from(\"/usr/bin/top\")]")]
    pub container_command: Vec<String>,
}

/// Settle budgets for asynchronous state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Budget for pause, unpause, start, and removal to become visible.
    #[default = 3000]
    pub transition_timeout_ms: u64,

    /// Budget for a stop to become visible.
    #[default = 10_000]
    pub stop_timeout_ms: u64,

    /// Delay between status observations.
    #[default = 250]
    pub poll_interval_ms: u64,

    /// Seconds the engine waits before killing a stopping container.
    #[default = 10]
    pub stop_grace_secs: u64,
}

impl SettleConfig {
    /// Returns the transition budget.
    #[must_use]
    pub const fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_timeout_ms)
    }

    /// Returns the stop budget.
    #[must_use]
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Scenario runner behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Wall-clock budget per step, in seconds.
    #[default = 60]
    pub step_timeout_secs: u64,

    /// Execute every step even after one fails.
    pub continue_on_failure: bool,

    /// Start the container through the host CLI instead of the remote API.
    #[default = true]
    pub run_via_cli: bool,
}

impl RunnerConfig {
    /// Returns the per-step budget.
    #[must_use]
    pub const fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

/// Host container CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Program invoked for the CLI run fallback and CLI cleanup.
    #[default = "podman"]
    pub program: String,
}

/// How set-up and tear-down cleanup is performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupStrategy {
    /// `rm -af` and `rmi -af` through the host CLI.
    #[default]
    Cli,
    /// List and force-remove through the engine API.
    Engine,
}

/// Cleanup configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// The cleanup strategy.
    pub strategy: CleanupStrategy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[default = "info"]
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `PODPROBE_CONFIG_PATH` environment variable
/// 2. `.podprobe.toml` in the current working directory
/// 3. `.podprobe.toml` in the home directory
/// 4. `~/.config/podprobe/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "PODPROBE",
    post_merge_hook,
    discovery(
        app_name = "podprobe",
        env_var = "PODPROBE_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".podprobe.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The container engine socket path or URL.
    pub engine_socket: Option<String>,

    /// Namespace qualifying method and fault names (default `io.podman`).
    pub interface: Option<String>,

    /// Overrides `subjects.image` when set.
    pub image: Option<String>,

    /// Shared scenario resources.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub subjects: SubjectsConfig,

    /// Settle budgets.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub settle: SettleConfig,

    /// Runner behaviour.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub runner: RunnerConfig,

    /// Host CLI settings.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub host: HostConfig,

    /// Cleanup strategy.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub cleanup: CleanupConfig,

    /// Logging settings.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Returns the interface namespace, falling back to `io.podman`.
    #[must_use]
    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or(DEFAULT_INTERFACE)
    }

    /// Returns the image to pull, honouring the top-level override.
    #[must_use]
    pub fn subject_image(&self) -> &str {
        self.image.as_deref().unwrap_or(&self.subjects.image)
    }

    /// Validates values the type system cannot rule out.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first offending field.
    pub fn validate(&self) -> crate::error::Result<()> {
        let checks: [(&str, bool, &str); 7] = [
            ("interface", self.interface().is_empty(), "cannot be empty"),
            ("subjects.image", self.subject_image().is_empty(), "cannot be empty"),
            (
                "subjects.container_name",
                self.subjects.container_name.is_empty(),
                "cannot be empty",
            ),
            ("host.program", self.host.program.is_empty(), "cannot be empty"),
            (
                "settle.poll_interval_ms",
                self.settle.poll_interval_ms == 0,
                "must be greater than zero",
            ),
            (
                "settle.stop_grace_secs",
                i32::try_from(self.settle.stop_grace_secs).is_err(),
                "is too large",
            ),
            (
                "runner.step_timeout_secs",
                self.runner.step_timeout_secs == 0,
                "must be greater than zero",
            ),
        ];

        match checks.into_iter().find(|(_, failed, _)| *failed) {
            Some((field, _, reason)) => Err(ConfigError::InvalidValue {
                field: field.to_owned(),
                reason: reason.to_owned(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Trailing whitespace in names would never match engine output.
        self.subjects.container_name = self.subjects.container_name.trim().to_owned();
        self.subjects.image_name = self.subjects.image_name.trim().to_owned();
        Ok(())
    }
}
