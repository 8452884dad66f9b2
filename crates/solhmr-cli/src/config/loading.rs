use crate::cli::{DevArgs, ProjectArgs};
use crate::config::{SolhmrConfig, CONFIG_FILE_NAME};
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Prefix of the environment variables read as configuration.
pub const ENV_PREFIX: &str = "SOLHMR_";

/// Environment keys (after the prefix) that map onto fields.
const ENV_KEYS: &[&str] = &[
    "project_dir",
    "contracts_dir",
    "build_dir",
    "ledger",
    "network_id",
    "build_timeout_secs",
    "explorer_api_key",
    "port",
    "ui_dir",
    "open",
];

impl SolhmrConfig {
    /// Load configuration for a one-shot command.
    pub fn load(args: &ProjectArgs) -> Result<Self> {
        Self::load_with(args, Map::new())
    }

    /// Load configuration for `solhmr dev`, including the server flags.
    pub fn load_for_dev(args: &DevArgs) -> Result<Self> {
        let mut overrides = Map::new();
        if let Some(port) = args.port {
            overrides.insert("port".to_string(), Value::from(port));
        }
        if let Some(ui_dir) = &args.ui_dir {
            overrides.insert("uiDir".to_string(), path_value(ui_dir));
        }
        if args.open {
            overrides.insert("open".to_string(), Value::Bool(true));
        }
        Self::load_with(&args.project, overrides)
    }

    /// Merge defaults, the config file, the environment and `overrides`.
    fn load_with(args: &ProjectArgs, mut overrides: Map<String, Value>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(args)? {
            tracing::debug!("loading configuration from {}", path.display());
            figment = figment.merge(Json::file_exact(path));
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .only(ENV_KEYS)
                .map(|key| env_key_to_field(key.as_str()).into())
                .lowercase(false),
        );

        if let Some(cwd) = &args.cwd {
            overrides.insert("projectDir".to_string(), path_value(cwd));
        }
        if let Some(network_id) = &args.network_id {
            overrides.insert("networkId".to_string(), Value::String(network_id.clone()));
        }
        if !overrides.is_empty() {
            figment = figment.merge(Serialized::defaults(Value::Object(overrides)));
        }

        let mut config = Self::from_figment(&figment)?;
        config.project_dir = relative_to_source(&figment, "projectDir", config.project_dir);
        config.validate()?;
        Ok(config)
    }

    /// The config file to read, if any.
    ///
    /// An explicit `--config` must exist; the default file is optional.
    pub fn config_file(args: &ProjectArgs) -> Result<Option<PathBuf>> {
        if let Some(path) = &args.config {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            return Ok(Some(path.clone()));
        }

        let dir = args.cwd.as_deref().unwrap_or_else(|| Path::new("."));
        let default_path = dir.join(CONFIG_FILE_NAME);
        Ok(default_path.is_file().then_some(default_path))
    }

    fn from_figment(figment: &Figment) -> Result<Self> {
        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {} and SOLHMR_* variables", CONFIG_FILE_NAME),
            }
            .into()
        })
    }
}

/// Resolve a relative `path` read from a config file against that file's
/// directory. Values from anywhere else are returned as they are.
fn relative_to_source(figment: &Figment, key: &str, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }

    let base = figment
        .find_metadata(key)
        .and_then(|metadata| metadata.source.as_ref())
        .and_then(|source| source.file_path())
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty());

    match base {
        Some(dir) => dir.join(path),
        None => path,
    }
}

/// `BUILD_TIMEOUT_SECS` -> `buildTimeoutSecs`
pub(crate) fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            field.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }
    field
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}
