//! Endpoint resolution from configuration and the environment.

/// Variables consulted, in order, when no endpoint is configured.
const FALLBACK_ENV_VARS: [&str; 3] = ["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// The rootful Podman service socket.
#[cfg(unix)]
const DEFAULT_SOCKET: &str = "unix:///run/podman/podman.sock";

/// The default Podman machine pipe.
#[cfg(windows)]
const DEFAULT_SOCKET: &str = "npipe:////./pipe/podman-machine-default";

/// Picks the engine endpoint for a run.
///
/// `E` supplies environment access, so tests resolve against a
/// `mockable::MockEnv` instead of the process environment.
///
/// # Example
///
/// ```ignore
/// use mockable::DefaultEnv;
/// use podprobe::engine::SocketResolver;
///
/// let env = DefaultEnv::new();
/// let socket = SocketResolver::new(&env).resolve(None);
/// ```
pub struct SocketResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> SocketResolver<'a, E> {
    /// Resolve against `env`.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Returns the first non-empty fallback variable, if any.
    #[must_use]
    pub fn fallback(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|name| self.env.string(name))
            .find(|value| !value.is_empty())
    }

    /// Returns the platform default endpoint.
    #[must_use]
    pub const fn default_socket() -> &'static str {
        DEFAULT_SOCKET
    }

    /// Resolve the endpoint: a non-empty `configured` value (CLI, file, or
    /// `PODPROBE_ENGINE_SOCKET`), then the fallback variables, then the
    /// platform default.
    #[must_use]
    pub fn resolve(&self, configured: Option<&str>) -> String {
        configured
            .filter(|socket| !socket.is_empty())
            .map(String::from)
            .or_else(|| self.fallback())
            .unwrap_or_else(|| DEFAULT_SOCKET.to_owned())
    }
}
