//! Shared mocks and helpers for unit tests.

use bollard::errors::Error as BollardError;
use mockall::mock;
use rstest::fixture;

use crate::engine::{
    ContainerRecord, ContainerSpec, ContainerStatus, EngineClient, EngineFuture, ImageRecord,
};
use crate::host::{CommandFuture, CommandRunner};

mock! {
    #[derive(Debug)]
    pub Engine {}

    impl EngineClient for Engine {
        fn pull_image<'a>(&'a self, reference: &str) -> EngineFuture<'a, ()>;
        fn inspect_image<'a>(&'a self, reference: &str) -> EngineFuture<'a, ImageRecord>;
        fn list_images<'a>(&'a self) -> EngineFuture<'a, Vec<ImageRecord>>;
        fn remove_image<'a>(&'a self, reference: &str, force: bool) -> EngineFuture<'a, ()>;
        fn create_container<'a>(&'a self, spec: &ContainerSpec) -> EngineFuture<'a, String>;
        fn start_container<'a>(&'a self, name: &str) -> EngineFuture<'a, ()>;
        fn inspect_container<'a>(&'a self, name: &str) -> EngineFuture<'a, ContainerRecord>;
        fn list_containers<'a>(&'a self) -> EngineFuture<'a, Vec<ContainerRecord>>;
        fn pause_container<'a>(&'a self, name: &str) -> EngineFuture<'a, ()>;
        fn unpause_container<'a>(&'a self, name: &str) -> EngineFuture<'a, ()>;
        fn stop_container<'a>(&'a self, name: &str, grace_secs: i32) -> EngineFuture<'a, ()>;
        fn remove_container<'a>(&'a self, name: &str, force: bool) -> EngineFuture<'a, ()>;
    }
}

mock! {
    #[derive(Debug)]
    pub Runner {}

    impl CommandRunner for Runner {
        fn run<'a>(&'a self, program: &str, args: &[String]) -> CommandFuture<'a>;
    }
}

/// Runtime for driving async code from synchronous tests.
#[fixture]
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("tokio runtime should build")
}

/// A 64-hex identifier derived from `seed`.
pub fn hex_id(seed: char) -> String {
    std::iter::repeat_n(seed, 64).collect()
}

/// An error response as the engine would send it.
pub fn server_error(status_code: u16, message: &str) -> BollardError {
    BollardError::DockerResponseServerError {
        status_code,
        message: String::from(message),
    }
}

/// A container record in `status` named `name`.
pub fn container(id: &str, name: &str, status: ContainerStatus) -> ContainerRecord {
    ContainerRecord {
        id: String::from(id),
        names: vec![String::from(name)],
        image: String::from("docker.io/library/alpine:latest"),
        status,
    }
}

/// Wrap a ready value in an engine future.
pub fn ready<T: Send + 'static>(value: Result<T, BollardError>) -> EngineFuture<'static, T> {
    Box::pin(async move { value })
}
