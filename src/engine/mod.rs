//! Container engine connection and the client seam the harness drives.
//!
//! The socket endpoint is resolved through a priority-based fallback chain:
//!
//! 1. CLI argument (`--engine-socket`)
//! 2. Config file (`engine_socket` in TOML)
//! 3. `PODPROBE_ENGINE_SOCKET` environment variable
//! 4. `DOCKER_HOST` environment variable
//! 5. `CONTAINER_HOST` environment variable
//! 6. `PODMAN_HOST` environment variable
//! 7. Platform default (`/run/podman/podman.sock` on Unix)

mod client;
mod connection;

pub use client::{
    ContainerRecord, ContainerSpec, ContainerStatus, EngineClient, EngineFuture, ImageRecord,
};
pub use connection::{EngineConnector, SocketResolver};
