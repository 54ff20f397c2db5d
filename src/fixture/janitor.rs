//! Idempotent cleanup actions and the strategies that perform them.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::EngineClient;
use crate::error::CleanupFault;
use crate::host::{CommandRunner, run_checked};

/// A cleanup action run before and after every scenario.
///
/// Both actions are no-ops when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupAction {
    /// Force-remove every container, running or not.
    RemoveAllContainers,
    /// Force-remove every local image.
    RemoveAllImages,
}

impl CleanupAction {
    /// The actions in the order they must run: containers pin their images.
    pub const SEQUENCE: [Self; 2] = [Self::RemoveAllContainers, Self::RemoveAllImages];

    /// Returns the host CLI arguments for this action.
    #[must_use]
    pub fn cli_arguments(self) -> Vec<String> {
        let args: [&str; 2] = match self {
            Self::RemoveAllContainers => ["rm", "-af"],
            Self::RemoveAllImages => ["rmi", "-af"],
        };
        args.into_iter().map(String::from).collect()
    }
}

impl fmt::Display for CleanupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RemoveAllContainers => "remove all containers",
            Self::RemoveAllImages => "remove all images",
        })
    }
}

/// Boxed future type returned by [`Janitor`] implementors.
pub type CleanupFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CleanupFault>> + Send + 'a>>;

/// Behaviour required to perform cleanup actions.
pub trait Janitor: Send + Sync {
    /// Perform `action`, succeeding when there is nothing to remove.
    fn perform(&self, action: CleanupAction) -> CleanupFuture<'_>;
}

impl<J: Janitor + ?Sized> Janitor for Box<J> {
    fn perform(&self, action: CleanupAction) -> CleanupFuture<'_> {
        J::perform(self, action)
    }
}

fn fault(action: CleanupAction, message: impl Into<String>) -> CleanupFault {
    CleanupFault {
        action: action.to_string(),
        message: message.into(),
    }
}

/// Cleans up through the host CLI (`rm -af`, `rmi -af`).
///
/// Needs no engine session, so it still works when connecting failed.
#[derive(Clone)]
pub struct CommandJanitor {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl CommandJanitor {
    /// Clean up by invoking `program` through `runner`.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

impl fmt::Debug for CommandJanitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandJanitor")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl Janitor for CommandJanitor {
    fn perform(&self, action: CleanupAction) -> CleanupFuture<'_> {
        Box::pin(async move {
            run_checked(self.runner.as_ref(), &self.program, &action.cli_arguments())
                .await
                .map(drop)
                .map_err(|e| fault(action, e.to_string()))
        })
    }
}

/// Cleans up through the engine API: list, then force-remove each entry.
#[derive(Debug, Clone)]
pub struct EngineJanitor<C> {
    client: C,
}

impl<C: EngineClient> EngineJanitor<C> {
    /// Clean up through `client`.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    async fn remove_all_containers(&self) -> Result<(), Vec<String>> {
        let containers = self
            .client
            .list_containers()
            .await
            .map_err(|e| vec![e.to_string()])?;
        let mut failures = Vec::new();
        for record in containers {
            if let Err(e) = self.client.remove_container(&record.id, true).await {
                failures.push(format!("{}: {e}", record.id));
            }
        }
        if failures.is_empty() { Ok(()) } else { Err(failures) }
    }

    async fn remove_all_images(&self) -> Result<(), Vec<String>> {
        let images = self
            .client
            .list_images()
            .await
            .map_err(|e| vec![e.to_string()])?;
        let mut failures = Vec::new();
        for image in images {
            if let Err(e) = self.client.remove_image(&image.id, true).await {
                failures.push(format!("{}: {e}", image.id));
            }
        }
        if failures.is_empty() { Ok(()) } else { Err(failures) }
    }
}

impl<C: EngineClient> Janitor for EngineJanitor<C> {
    fn perform(&self, action: CleanupAction) -> CleanupFuture<'_> {
        Box::pin(async move {
            let result = match action {
                CleanupAction::RemoveAllContainers => self.remove_all_containers().await,
                CleanupAction::RemoveAllImages => self.remove_all_images().await,
            };
            result.map_err(|failures| fault(action, failures.join("; ")))
        })
    }
}
