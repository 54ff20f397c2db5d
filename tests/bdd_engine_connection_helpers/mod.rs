//! Behavioural test helpers for container engine connection.
//!
//! Socket resolution runs against a `MockEnv` built from the variables each
//! scenario declares; the connection check runs against a socket path that
//! does not exist.

use std::collections::HashMap;

use mockable::MockEnv;
use podprobe::engine::{EngineConnector, SocketResolver};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, then, when};

/// Step result type for BDD tests, using a static string for errors.
pub type StepResult<T> = Result<T, &'static str>;

/// State shared across engine connection test scenarios.
#[derive(Default, ScenarioState)]
pub struct EngineConnectionState {
    /// Variables the mocked environment reports.
    env_vars: Slot<HashMap<String, String>>,
    /// Socket from configuration (CLI, config file, `PODPROBE_ENGINE_SOCKET`).
    config_socket: Slot<Option<String>>,
    /// The resolved socket endpoint.
    resolved_socket: Slot<String>,
    /// Fault message from a failed connection check.
    connection_error: Slot<String>,
}

/// Fixture providing a fresh engine connection state.
#[fixture]
pub fn engine_connection_state() -> EngineConnectionState {
    let state = EngineConnectionState::default();
    state.env_vars.set(HashMap::new());
    state.config_socket.set(None);
    state
}

fn set_env_var(state: &EngineConnectionState, key: &str, value: &str) -> StepResult<()> {
    let mut vars = state.env_vars.get().ok_or("env_vars should be initialised")?;
    vars.insert(String::from(key), String::from(value));
    state.env_vars.set(vars);
    Ok(())
}

fn create_mock_env(state: &EngineConnectionState) -> StepResult<MockEnv> {
    let vars = state.env_vars.get().ok_or("env_vars should be initialised")?;
    let mut mock = MockEnv::new();
    mock.expect_string()
        .returning(move |key| vars.get(key).cloned());
    Ok(mock)
}

#[given("no engine socket is configured")]
fn no_engine_socket_configured(engine_connection_state: &EngineConnectionState) {
    engine_connection_state.config_socket.set(None);
}

#[given("engine socket is configured as {socket}")]
fn engine_socket_configured_as(engine_connection_state: &EngineConnectionState, socket: String) {
    engine_connection_state.config_socket.set(Some(socket));
}

#[given("{name} is set to {value}")]
fn variable_is_set_to(
    engine_connection_state: &EngineConnectionState,
    name: String,
    value: String,
) -> StepResult<()> {
    set_env_var(engine_connection_state, &name, &value)
}

#[given("{name} is empty")]
fn variable_is_empty(engine_connection_state: &EngineConnectionState, name: String) -> StepResult<()> {
    set_env_var(engine_connection_state, &name, "")
}

#[when("the socket is resolved")]
fn the_socket_is_resolved(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    let env = create_mock_env(engine_connection_state)?;
    let resolver = SocketResolver::new(&env);
    let config_socket = engine_connection_state.config_socket.get().flatten();
    let socket = resolver.resolve(config_socket.as_deref());
    engine_connection_state.resolved_socket.set(socket);
    Ok(())
}

#[when("a connection to a missing socket is verified")]
fn connect_to_missing_socket(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    let dir = tempfile::tempdir().map_err(|_| "tempdir should be created")?;
    let socket = format!("unix://{}/absent.sock", dir.path().display());
    let runtime = tokio::runtime::Runtime::new().map_err(|_| "runtime should build")?;

    match runtime.block_on(EngineConnector::connect_and_verify_async(&socket)) {
        Ok(_) => Err("connecting to a missing socket should fail"),
        Err(fault) => {
            engine_connection_state
                .connection_error
                .set(fault.to_string());
            Ok(())
        }
    }
}

#[then("the resolved socket is {expected}")]
fn the_resolved_socket_is(
    engine_connection_state: &EngineConnectionState,
    expected: String,
) -> StepResult<()> {
    let resolved = engine_connection_state
        .resolved_socket
        .get()
        .ok_or("resolved socket should be set")?;
    assert_eq!(
        resolved, expected,
        "Expected resolved socket to be '{expected}', but got '{resolved}'"
    );
    Ok(())
}

#[then("the socket resolves to the platform default")]
fn the_socket_resolves_to_platform_default(
    engine_connection_state: &EngineConnectionState,
) -> StepResult<()> {
    let resolved = engine_connection_state
        .resolved_socket
        .get()
        .ok_or("resolved socket should be set")?;
    assert_eq!(resolved, SocketResolver::<MockEnv>::default_socket());
    Ok(())
}

#[then("a connection fault naming the socket is reported")]
fn connection_fault_reported(engine_connection_state: &EngineConnectionState) -> StepResult<()> {
    let message = engine_connection_state
        .connection_error
        .get()
        .ok_or("connection error should be set")?;
    assert!(
        message.contains("absent.sock") || message.contains("container engine"),
        "unexpected connection fault: {message}"
    );
    Ok(())
}
