//! System-state prober.
//!
//! Read-only oracles over the engine's observable state. Transition requests
//! return before the transition is visible, so callers pair these queries with
//! [`wait_until`] rather than probing once and trusting the answer.

mod settle;

pub use settle::{SettlePolicy, Settled, wait_until};

pub use crate::engine::ContainerStatus;
use crate::engine::EngineClient;
use crate::error::RemoteFault;
use crate::remote::RemoteAdapter;

/// Queries container status and resource counts through the adapter.
#[derive(Debug)]
pub struct StateProber<'a, C> {
    remote: &'a RemoteAdapter<C>,
}

impl<'a, C: EngineClient> StateProber<'a, C> {
    /// Probe through `remote`.
    #[must_use]
    pub const fn new(remote: &'a RemoteAdapter<C>) -> Self {
        Self { remote }
    }

    /// Current status of the named container.
    ///
    /// Transitional states the engine reports are returned as observed,
    /// typically as [`ContainerStatus::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns the engine's fault when the lookup itself fails.
    pub async fn current_status(&self, name: &str) -> Result<ContainerStatus, RemoteFault> {
        Ok(self.remote.get_container(name).await?.status)
    }

    /// Number of containers, including stopped ones.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault when the listing fails.
    pub async fn container_count(&self) -> Result<usize, RemoteFault> {
        Ok(self.remote.list_containers().await?.len())
    }

    /// Number of local images.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault when the listing fails.
    pub async fn image_count(&self) -> Result<usize, RemoteFault> {
        Ok(self.remote.list_images().await?.len())
    }

    /// Poll the named container until it reports `expected`.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault when a lookup fails.
    pub async fn settle_status(
        &self,
        name: &str,
        expected: ContainerStatus,
        policy: SettlePolicy,
    ) -> Result<Settled<ContainerStatus>, RemoteFault> {
        wait_until(
            policy,
            || self.current_status(name),
            |status| *status == expected,
        )
        .await
    }

    /// Poll the container listing until it holds `expected` entries.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault when a listing fails.
    pub async fn settle_container_count(
        &self,
        expected: usize,
        policy: SettlePolicy,
    ) -> Result<Settled<usize>, RemoteFault> {
        wait_until(policy, || self.container_count(), |count| *count == expected).await
    }

    /// Poll the image listing until it holds `expected` entries.
    ///
    /// # Errors
    ///
    /// Returns the engine's fault when a listing fails.
    pub async fn settle_image_count(
        &self,
        expected: usize,
        policy: SettlePolicy,
    ) -> Result<Settled<usize>, RemoteFault> {
        wait_until(policy, || self.image_count(), |count| *count == expected).await
    }
}
