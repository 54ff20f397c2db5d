//! Configuration system for podprobe.
//!
//! Configuration loading and precedence merging is handled by the
//! `ortho_config` crate: CLI flags override environment variables, which
//! override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/podprobe/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! engine_socket = "unix:///run/podman/podman.sock"
//! interface = "io.podman"
//!
//! [subjects]
//! image = "alpine:latest"
//! image_name = "alpine"
//! expected_repo_tag = "docker.io/library/alpine:latest"
//! container_name = "test"
//! container_command = ["/usr/bin/top"]
//!
//! [settle]
//! transition_timeout_ms = 3000
//! stop_timeout_ms = 10000
//! poll_interval_ms = 250
//! stop_grace_secs = 10
//!
//! [runner]
//! step_timeout_secs = 60
//! continue_on_failure = false
//! run_via_cli = true
//!
//! [host]
//! program = "podman"
//!
//! [cleanup]
//! strategy = "cli"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{Cli, Commands, RunArgs};
pub use loader::{env_var_names, load_config};
pub use types::{
    AppConfig, CleanupConfig, CleanupStrategy, HostConfig, LogFormat, LoggingConfig,
    RunnerConfig, SettleConfig, SubjectsConfig,
};
