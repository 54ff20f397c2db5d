//! Opening and verifying the engine session.
//!
//! The endpoint comes from [`SocketResolver`]; [`EngineConnector`] turns it
//! into a `Bollard` client and pings it. A session that cannot be opened or
//! does not answer becomes a [`ConnectionFault`], which is fatal to a run but
//! never skips tear-down cleanup.

mod endpoint;
mod error_classification;
mod resolver;

use std::time::Duration;

use bollard::Docker;

use self::endpoint::Endpoint;
use self::error_classification::{classify_connection_error, classify_ping_error};
use crate::error::ConnectionFault;

pub use resolver::SocketResolver;

/// Request timeout in seconds for engine API calls.
///
/// Pulls stream progress for as long as the registry takes, so this is
/// generous.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Timeout in seconds for the set-up ping.
const PING_TIMEOUT_SECS: u64 = 10;

/// Opens sessions with Docker-compatible container engines.
pub struct EngineConnector;

impl EngineConnector {
    /// Build a client for `socket` without contacting the engine.
    ///
    /// Accepts `unix://`, `npipe://`, `tcp://`, `http://`, and `https://`
    /// endpoints, and bare socket or pipe paths.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFault::SocketNotFound`, `PermissionDenied`, or
    /// `ConnectionFailed` if the client cannot be created.
    pub fn connect(socket: &str) -> Result<Docker, ConnectionFault> {
        let endpoint = Endpoint::parse(socket);
        let client = match &endpoint {
            Endpoint::Local(uri) => {
                Docker::connect_with_socket(uri, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
            Endpoint::Remote(uri) => {
                Docker::connect_with_http(uri, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
        };
        client.map_err(|error| classify_connection_error(&error, endpoint.uri()))
    }

    /// Build a client for `socket` and wait for it to answer a ping.
    ///
    /// # Errors
    ///
    /// Returns any fault from [`Self::connect`], `HealthCheckFailed` when the
    /// ping is refused, or `HealthCheckTimeout` when it goes unanswered.
    pub async fn connect_and_verify_async(
        socket: impl AsRef<str>,
    ) -> Result<Docker, ConnectionFault> {
        let socket_str = socket.as_ref();
        let docker = Self::connect(socket_str)?;
        let endpoint = Endpoint::parse(socket_str);

        tokio::time::timeout(Duration::from_secs(PING_TIMEOUT_SECS), docker.ping())
            .await
            .map_err(|_| ConnectionFault::HealthCheckTimeout {
                seconds: PING_TIMEOUT_SECS,
            })?
            .map_err(|error| classify_ping_error(&error, endpoint.uri()))?;
        tracing::debug!(socket = endpoint.uri(), "engine answered ping");
        Ok(docker)
    }

    /// Resolve the endpoint through `resolver`, then connect and verify.
    ///
    /// # Errors
    ///
    /// Returns any fault from [`Self::connect_and_verify_async`].
    pub async fn connect_with_fallback_and_verify_async<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> Result<Docker, ConnectionFault> {
        let socket = resolver.resolve(config_socket);
        tracing::info!(%socket, "opening engine session");
        Self::connect_and_verify_async(socket).await
    }

    /// Create a tokio runtime for the synchronous entry point.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFault::RuntimeCreationFailed` if the runtime cannot
    /// be built.
    pub fn create_runtime() -> Result<tokio::runtime::Runtime, ConnectionFault> {
        tokio::runtime::Runtime::new().map_err(|e| ConnectionFault::RuntimeCreationFailed {
            message: e.to_string(),
        })
    }
}
