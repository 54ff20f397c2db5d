//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use ortho_config::MergeComposer;
use ortho_config::serde_json::json;
use rstest::fixture;

use crate::config::{AppConfig, CleanupStrategy, LogFormat};

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        engine_socket = "unix:///run/podman/podman.sock"
        interface = "io.podman"
        image = "busybox:latest"

        [subjects]
        image_name = "busybox"
        expected_repo_tag = "docker.io/library/busybox:latest"
        container_name = "probe"
        container_command = ["sleep", "infinity"]

        [settle]
        transition_timeout_ms = 5000
        poll_interval_ms = 100

        [runner]
        continue_on_failure = true
        run_via_cli = false

        [host]
        program = "docker"

        [cleanup]
        strategy = "engine"

        [logging]
        level = "debug"
        format = "json"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r#"
        engine_socket = "unix:///tmp/podman.sock"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(config.engine_socket.is_none(), "engine_socket should be None");
    assert_eq!(config.interface(), "io.podman");
    assert_eq!(config.subject_image(), "alpine:latest");
    assert_eq!(config.subjects.container_name, "test");
    assert_eq!(config.settle.transition_timeout_ms, 3000);
    assert_eq!(config.settle.stop_timeout_ms, 10_000);
    assert!(config.runner.run_via_cli, "runner.run_via_cli should be true");
    assert!(!config.runner.continue_on_failure);
    assert_eq!(config.host.program, "podman");
    assert_eq!(config.cleanup.strategy, CleanupStrategy::Cli);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

/// Helper: Creates a composer with defaults, file, and env layers.
pub fn create_composer_with_file_and_env() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = create_composer_with_defaults()?;

    composer.push_file(
        json!({
            "engine_socket": "unix:///from/file.sock",
            "subjects": { "container_name": "from-file" }
        }),
        None,
    );

    composer.push_environment(json!({
        "engine_socket": "unix:///from/env.sock"
    }));

    Ok(composer)
}
