//! Run-container via the host CLI.
//!
//! Workaround: the engine's remote run path has an upstream gap, so by default
//! containers are started with `<program> run -d` on the host instead. This is
//! an escape hatch, not a primary interface; disable it with
//! `runner.run_via_cli = false` once the remote path is fixed.

use crate::engine::ContainerSpec;
use crate::error::HostCommandError;
use crate::host::{CommandRunner, render_command, run_checked};

/// Build the argument list for a detached named run.
#[must_use]
pub fn run_arguments(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        String::from("run"),
        String::from("-d"),
        String::from("--name"),
        spec.name.clone(),
        spec.image.clone(),
    ];
    args.extend(spec.command.iter().flatten().cloned());
    args
}

/// Start `spec` through the host CLI and return the new container identifier.
///
/// The identifier is the last non-empty line of standard output, which skips
/// any pull progress the CLI prints first.
///
/// # Errors
///
/// Returns a [`HostCommandError`] if the command cannot be spawned, exits
/// unsuccessfully, or prints nothing.
pub async fn run_via_cli(
    runner: &dyn CommandRunner,
    program: &str,
    spec: &ContainerSpec,
) -> Result<String, HostCommandError> {
    let args = run_arguments(spec);
    let stdout = run_checked(runner, program, &args).await?;
    stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| HostCommandError::EmptyOutput {
            command: render_command(program, &args),
        })
}
