//! Engine client seam.
//!
//! [`EngineClient`] names every remote capability the harness exercises and
//! hands back plain records instead of `Bollard` models, so the adapter,
//! prober, and janitor can be driven by mocks or an in-memory fake. The
//! production implementation is `bollard::Docker` talking to the engine's
//! Docker-compatible API.

mod docker;
mod records;

use std::future::Future;
use std::pin::Pin;

use bollard::errors::Error as BollardError;

pub use records::{ContainerRecord, ContainerSpec, ContainerStatus, ImageRecord};

/// Boxed future type returned by [`EngineClient`] implementors.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BollardError>> + Send + 'a>>;

/// Remote capabilities of the container engine under test.
///
/// Every method maps onto one engine request (pulling drains the progress
/// stream before resolving). Failures are returned as raw `Bollard` errors;
/// turning them into named faults is the adapter's job.
pub trait EngineClient: Send + Sync {
    /// Pull `reference` from its registry.
    fn pull_image(&self, reference: &str) -> EngineFuture<'_, ()>;

    /// Inspect a local image by name, tag, or identifier.
    fn inspect_image(&self, reference: &str) -> EngineFuture<'_, ImageRecord>;

    /// List local images.
    fn list_images(&self) -> EngineFuture<'_, Vec<ImageRecord>>;

    /// Remove a local image.
    fn remove_image(&self, reference: &str, force: bool) -> EngineFuture<'_, ()>;

    /// Create a container and return its identifier.
    fn create_container(&self, spec: &ContainerSpec) -> EngineFuture<'_, String>;

    /// Start a created or stopped container.
    fn start_container(&self, name: &str) -> EngineFuture<'_, ()>;

    /// Inspect a container by name or identifier.
    fn inspect_container(&self, name: &str) -> EngineFuture<'_, ContainerRecord>;

    /// List all containers, including stopped ones.
    fn list_containers(&self) -> EngineFuture<'_, Vec<ContainerRecord>>;

    /// Freeze a running container.
    fn pause_container(&self, name: &str) -> EngineFuture<'_, ()>;

    /// Thaw a paused container.
    fn unpause_container(&self, name: &str) -> EngineFuture<'_, ()>;

    /// Stop a container, killing it after `grace_secs`.
    fn stop_container(&self, name: &str, grace_secs: i32) -> EngineFuture<'_, ()>;

    /// Remove a container.
    fn remove_container(&self, name: &str, force: bool) -> EngineFuture<'_, ()>;
}
