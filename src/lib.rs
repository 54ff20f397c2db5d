//! Ordered lifecycle integration harness for a container engine.
//!
//! `podprobe` drives a running Podman (or Docker-compatible) service through
//! one stateful scenario: pull an image, inspect and list it, run a container,
//! pause, unpause, stop, start, and remove it, then confirm that removed
//! resources are reported as missing. Each step asserts both the direct result
//! of its call and, where the call changes engine state, what a follow-up
//! query observes once the change has settled.
//!
//! # Architecture
//!
//! The steps share engine state, so they run strictly in order and the first
//! failure aborts the rest. Every run is wrapped in fixture cleanup that
//! removes all containers and images before and after the scenario, whatever
//! happened in between.
//!
//! # Modules
//!
//! - [`api`]: Orchestration functions behind each CLI command
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Engine connection and the [`engine::EngineClient`] seam
//! - [`error`]: Semantic error types for the application
//! - [`fixture`]: Set-up and tear-down cleanup around a scenario run
//! - [`host`]: Host container CLI invocation
//! - [`logging`]: Tracing subscriber initialisation
//! - [`probe`]: Settle-then-observe queries of engine state
//! - [`remote`]: Call wrapper mapping engine errors to named faults
//! - [`scenario`]: Step model, the lifecycle scenario, and its runner

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod host;
pub mod logging;
pub mod probe;
pub mod remote;
pub mod scenario;

#[cfg(test)]
pub(crate) mod test_support;
