//! Host-side container-management CLI invocation.
//!
//! Two parts of the harness go around the engine API: the run-container
//! fallback and command-strategy cleanup. Both shell out to the host's
//! container CLI (`podman` by default) through [`CommandRunner`], which keeps
//! process spawning mockable in tests.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{ExitCode, HostCommandError};

/// Captured result of a finished host command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status code, absent when terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns whether the command exited with status zero.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Boxed future type returned by [`CommandRunner`] implementors.
pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = io::Result<CommandOutput>> + Send + 'a>>;

/// Behaviour required to run a host command to completion.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, capturing its output.
    fn run(&self, program: &str, args: &[String]) -> CommandFuture<'_>;
}

/// [`CommandRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> CommandFuture<'_> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Box::pin(async move {
            let output = command.output().await?;
            Ok(CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        })
    }
}

/// Render a command line for diagnostics.
#[must_use]
pub fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command and return its standard output, failing on non-zero exit.
///
/// # Errors
///
/// Returns [`HostCommandError::SpawnFailed`] if the process cannot be started
/// and [`HostCommandError::NonZeroExit`] if it exits unsuccessfully.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[String],
) -> Result<String, HostCommandError> {
    let command_line = render_command(program, args);
    tracing::debug!(command = %command_line, "running host command");

    let output = runner
        .run(program, args)
        .await
        .map_err(|e| HostCommandError::SpawnFailed {
            program: program.to_owned(),
            message: e.to_string(),
        })?;

    if output.succeeded() {
        Ok(output.stdout)
    } else {
        Err(HostCommandError::NonZeroExit {
            command: command_line,
            code: ExitCode(output.code),
            stderr: output.stderr.trim().to_owned(),
        })
    }
}
