//! Configuration loading with layered precedence.
//!
//! Precedence (lowest to highest): application defaults, configuration file,
//! `PODPROBE_*` environment variables, command-line arguments.
//!
//! Layers are composed with `MergeComposer` directly instead of
//! `AppConfig::load()`: the clap [`Cli`] owns subcommand dispatch, and typed
//! environment values must fail fast. Figment's environment layer would
//! silently drop `PODPROBE_RUNNER_RUN_VIA_CLI=maybe`; here it is an error.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli, Commands};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Boolean value (`true`/`false`). Invalid values return an error.
    Bool,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// One environment variable and the config path it sets.
struct EnvVarSpec {
    env_var: &'static str,
    path: &'static [&'static str],
    var_type: EnvVarType,
}

const fn spec(
    env_var: &'static str,
    path: &'static [&'static str],
    var_type: EnvVarType,
) -> EnvVarSpec {
    EnvVarSpec {
        env_var,
        path,
        var_type,
    }
}

/// Every recognised environment variable and the config path it sets.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    spec("PODPROBE_ENGINE_SOCKET", &["engine_socket"], EnvVarType::String),
    spec("PODPROBE_INTERFACE", &["interface"], EnvVarType::String),
    spec("PODPROBE_IMAGE", &["image"], EnvVarType::String),
    spec("PODPROBE_SUBJECTS_IMAGE", &["subjects", "image"], EnvVarType::String),
    spec(
        "PODPROBE_SUBJECTS_IMAGE_NAME",
        &["subjects", "image_name"],
        EnvVarType::String,
    ),
    spec(
        "PODPROBE_SUBJECTS_EXPECTED_REPO_TAG",
        &["subjects", "expected_repo_tag"],
        EnvVarType::String,
    ),
    spec(
        "PODPROBE_SUBJECTS_CONTAINER_NAME",
        &["subjects", "container_name"],
        EnvVarType::String,
    ),
    spec(
        "PODPROBE_SETTLE_TRANSITION_TIMEOUT_MS",
        &["settle", "transition_timeout_ms"],
        EnvVarType::U64,
    ),
    spec(
        "PODPROBE_SETTLE_STOP_TIMEOUT_MS",
        &["settle", "stop_timeout_ms"],
        EnvVarType::U64,
    ),
    spec(
        "PODPROBE_SETTLE_POLL_INTERVAL_MS",
        &["settle", "poll_interval_ms"],
        EnvVarType::U64,
    ),
    spec(
        "PODPROBE_SETTLE_STOP_GRACE_SECS",
        &["settle", "stop_grace_secs"],
        EnvVarType::U64,
    ),
    spec(
        "PODPROBE_RUNNER_STEP_TIMEOUT_SECS",
        &["runner", "step_timeout_secs"],
        EnvVarType::U64,
    ),
    spec(
        "PODPROBE_RUNNER_CONTINUE_ON_FAILURE",
        &["runner", "continue_on_failure"],
        EnvVarType::Bool,
    ),
    spec(
        "PODPROBE_RUNNER_RUN_VIA_CLI",
        &["runner", "run_via_cli"],
        EnvVarType::Bool,
    ),
    spec("PODPROBE_HOST_PROGRAM", &["host", "program"], EnvVarType::String),
    spec(
        "PODPROBE_CLEANUP_STRATEGY",
        &["cleanup", "strategy"],
        EnvVarType::String,
    ),
    spec("PODPROBE_LOGGING_LEVEL", &["logging", "level"], EnvVarType::String),
    spec("PODPROBE_LOGGING_FORMAT", &["logging", "format"], EnvVarType::String),
];

/// Returns the environment variable names recognised by the loader.
///
/// Tests use this to clear every `PODPROBE_*` variable without keeping a
/// second list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Read a configuration file through `cap_std` and push it to the composer.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Locate the configuration file: the `--config` path, else discovery.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` when `--config` names a missing file.
fn discover_config_path(cli: &Cli) -> Result<Option<Utf8PathBuf>> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.clone().into_std_path_buf(),
            }
            .into());
        }
        return Ok(Some(path.clone()));
    }
    Ok(ConfigDiscovery::builder("podprobe")
        .env_var("PODPROBE_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".podprobe.toml")
        .build()
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Load configuration with full layer precedence.
///
/// # Errors
///
/// Returns `ConfigError` if an explicit configuration file is missing, a
/// configuration file cannot be read or parsed, a
/// typed environment variable holds an unparseable value, or the merged
/// layers do not deserialise.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = discover_config_path(cli)? {
        load_config_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars()?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    Ok(AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?)
}

fn parse_env_value(spec: &EnvVarSpec, raw_value: String) -> Result<Value> {
    match spec.var_type {
        EnvVarType::String => Ok(Value::String(raw_value)),
        EnvVarType::Bool => raw_value.parse::<bool>().map(Value::Bool).map_err(|_| {
            ConfigError::InvalidValue {
                field: spec.env_var.to_owned(),
                reason: format!("expected bool (true/false), got '{raw_value}'"),
            }
            .into()
        }),
        EnvVarType::U64 => raw_value
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| {
                ConfigError::InvalidValue {
                    field: spec.env_var.to_owned(),
                    reason: format!("expected unsigned integer, got '{raw_value}'"),
                }
                .into()
            }),
    }
}

/// Collect `PODPROBE_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed variable has an
/// unparseable value.
fn collect_env_vars() -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Ok(raw_value) = std::env::var(spec.env_var) else {
            continue;
        };
        let json_value = parse_env_value(spec, raw_value)?;
        insert_at_path(&mut root, spec.path, json_value);
    }

    Ok(object_or_null(root))
}

/// An empty layer is `Null` so the composer skips it.
fn object_or_null(map: Map<String, Value>) -> Value {
    if map.is_empty() {
        Value::Null
    } else {
        Value::Object(map)
    }
}

/// Insert a value at a nested path, creating intermediate objects.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref socket) = cli.engine_socket {
        insert_at_path(&mut overrides, &["engine_socket"], Value::String(socket.clone()));
    }

    if let Some(ref image) = cli.image {
        insert_at_path(&mut overrides, &["image"], Value::String(image.clone()));
    }

    if let Commands::Run(ref args) = cli.command
        && args.continue_on_failure
    {
        insert_at_path(
            &mut overrides,
            &["runner", "continue_on_failure"],
            Value::Bool(true),
        );
    }

    object_or_null(overrides)
}
