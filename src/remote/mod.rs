//! Remote interface adapter.
//!
//! [`RemoteAdapter`] exposes one method per remote capability of the engine,
//! takes the minimal identifying input, and returns either a plain value or a
//! [`RemoteFault`] whose kind is the engine's fully-qualified fault name. Fault
//! identity is never reinterpreted or swallowed here: steps match on it.
//!
//! State-changing container calls resolve the container's full identifier
//! before issuing the request and return it, so every mutation reports the
//! content-addressed identifier of what it touched.

mod fault;
mod host_run;
mod operation;

use std::fmt;
use std::sync::Arc;

pub use fault::{FaultKind, classify};
pub use host_run::run_arguments;
pub use operation::{Operation, ResourceCategory};

use crate::engine::{ContainerRecord, ContainerSpec, EngineClient, EngineFuture, ImageRecord};
use crate::error::{CallError, RemoteFault};
use crate::host::CommandRunner;

/// Default interface namespace for qualified method and fault names.
pub const DEFAULT_INTERFACE: &str = "io.podman";

/// How [`RemoteAdapter::run_container`] starts containers.
#[derive(Clone)]
pub enum RunPath {
    /// Create then start over the remote protocol.
    Protocol,
    /// Workaround path through the host CLI.
    HostCli {
        /// Process runner used to invoke the CLI.
        runner: Arc<dyn CommandRunner>,
        /// CLI program name, e.g. `podman`.
        program: String,
    },
}

impl fmt::Debug for RunPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol => f.write_str("Protocol"),
            Self::HostCli { program, .. } => f
                .debug_struct("HostCli")
                .field("program", program)
                .finish_non_exhaustive(),
        }
    }
}

/// Uniform call-and-result wrapper over an [`EngineClient`].
#[derive(Debug)]
pub struct RemoteAdapter<C> {
    client: C,
    interface: String,
    run_path: RunPath,
}

impl<C: EngineClient> RemoteAdapter<C> {
    /// Wrap `client`, qualifying names under `interface`.
    #[must_use]
    pub fn new(client: C, interface: impl Into<String>, run_path: RunPath) -> Self {
        Self {
            client,
            interface: interface.into(),
            run_path,
        }
    }

    async fn call<T>(
        &self,
        operation: Operation,
        request: EngineFuture<'_, T>,
    ) -> Result<T, RemoteFault> {
        let method = operation.qualified(&self.interface);
        tracing::debug!(%method, "calling engine");
        request.await.map_err(|e| {
            let fault = classify(&self.interface, operation, &e);
            tracing::debug!(%method, kind = %fault.kind, detail = %fault.detail, "engine fault");
            fault
        })
    }

    /// Pull `reference` and return the pulled image's identifier.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault for the pull or the follow-up lookup.
    pub async fn pull_image(&self, reference: &str) -> Result<String, RemoteFault> {
        self.call(Operation::PullImage, self.client.pull_image(reference))
            .await?;
        Ok(self.get_image(reference).await?.id)
    }

    /// List local images.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault for the listing.
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>, RemoteFault> {
        self.call(Operation::ListImages, self.client.list_images())
            .await
    }

    /// Look up one image by name, tag, or identifier.
    ///
    /// # Errors
    ///
    /// Returns an `ImageNotFound` fault when the image does not exist.
    pub async fn get_image(&self, reference: &str) -> Result<ImageRecord, RemoteFault> {
        self.call(Operation::GetImage, self.client.inspect_image(reference))
            .await
    }

    /// Remove an image and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns an `ImageNotFound` fault when the image does not exist, or the
    /// engine's fault for the removal.
    pub async fn remove_image(&self, reference: &str, force: bool) -> Result<String, RemoteFault> {
        let image = self.get_image(reference).await?;
        self.call(
            Operation::RemoveImage,
            self.client.remove_image(reference, force),
        )
        .await?;
        Ok(image.id)
    }

    /// Create and start a container, returning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Remote`] for engine faults and
    /// [`CallError::HostCommand`] when the CLI workaround path fails.
    pub async fn run_container(&self, spec: &ContainerSpec) -> Result<String, CallError> {
        match &self.run_path {
            RunPath::HostCli { runner, program } => {
                tracing::debug!(
                    container = %spec.name,
                    %program,
                    "running container through host CLI workaround"
                );
                Ok(host_run::run_via_cli(runner.as_ref(), program, spec).await?)
            }
            RunPath::Protocol => {
                let id = self
                    .call(Operation::CreateContainer, self.client.create_container(spec))
                    .await?;
                self.call(Operation::StartContainer, self.client.start_container(&id))
                    .await?;
                Ok(id)
            }
        }
    }

    /// Look up one container by name or identifier.
    ///
    /// # Errors
    ///
    /// Returns a `ContainerNotFound` fault when the container does not exist.
    pub async fn get_container(&self, name: &str) -> Result<ContainerRecord, RemoteFault> {
        self.call(Operation::GetContainer, self.client.inspect_container(name))
            .await
    }

    /// List all containers, including stopped ones.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault for the listing.
    pub async fn list_containers(&self) -> Result<Vec<ContainerRecord>, RemoteFault> {
        self.call(Operation::ListContainers, self.client.list_containers())
            .await
    }

    async fn resolve_container_id(&self, name: &str) -> Result<String, RemoteFault> {
        Ok(self.get_container(name).await?.id)
    }

    /// Pause a container and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns a `ContainerNotFound` or `InvalidState` fault from the engine.
    pub async fn pause_container(&self, name: &str) -> Result<String, RemoteFault> {
        let id = self.resolve_container_id(name).await?;
        self.call(Operation::PauseContainer, self.client.pause_container(&id))
            .await?;
        Ok(id)
    }

    /// Unpause a container and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns a `ContainerNotFound` or `InvalidState` fault from the engine.
    pub async fn unpause_container(&self, name: &str) -> Result<String, RemoteFault> {
        let id = self.resolve_container_id(name).await?;
        self.call(
            Operation::UnpauseContainer,
            self.client.unpause_container(&id),
        )
        .await?;
        Ok(id)
    }

    /// Stop a container and return its identifier.
    ///
    /// The engine kills the container once `grace_secs` elapse.
    ///
    /// # Errors
    ///
    /// Returns a `ContainerNotFound` or `InvalidState` fault from the engine.
    pub async fn stop_container(&self, name: &str, grace_secs: i32) -> Result<String, RemoteFault> {
        let id = self.resolve_container_id(name).await?;
        self.call(
            Operation::StopContainer,
            self.client.stop_container(&id, grace_secs),
        )
        .await?;
        Ok(id)
    }

    /// Start a stopped container and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns a `ContainerNotFound` or `InvalidState` fault from the engine.
    pub async fn start_container(&self, name: &str) -> Result<String, RemoteFault> {
        let id = self.resolve_container_id(name).await?;
        self.call(Operation::StartContainer, self.client.start_container(&id))
            .await?;
        Ok(id)
    }

    /// Remove a container and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns a `ContainerNotFound` fault, or `InvalidState` when removing a
    /// running container without `force`.
    pub async fn remove_container(&self, name: &str, force: bool) -> Result<String, RemoteFault> {
        let id = self.resolve_container_id(name).await?;
        self.call(
            Operation::RemoveContainer,
            self.client.remove_container(&id, force),
        )
        .await?;
        Ok(id)
    }
}
