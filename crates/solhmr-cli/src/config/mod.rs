//! Configuration for solhmr, loaded from several sources.
//!
//! Priority: CLI > Environment (`SOLHMR_*`) > `solhmr.config.json` > Defaults

mod defaults;
mod loading;
mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use solhmr::resolver::default_explorers;
use solhmr::{BuildCommand, EtherscanResolver, ProjectLayout};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use defaults::*;
pub use loading::ENV_PREFIX;
pub use validation::validate_against_schema;

use crate::error::{ConfigError, Result};

/// Name of the configuration file looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "solhmr.config.json";

/// solhmr configuration - loaded from solhmr.config.json, env and CLI args.
///
/// Relative paths are resolved against `projectDir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SolhmrConfig {
    /// Directory the build tool runs in
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Directory holding the contract sources; watched for changes
    #[serde(default = "default_contracts_dir")]
    pub contracts_dir: PathBuf,

    /// Directory the build tool writes its JSON artifacts to
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Deployment ledger file
    #[serde(default = "default_ledger")]
    pub ledger: PathBuf,

    /// Network id of the local development chain
    #[schemars(with = "String", regex(pattern = r"^[0-9]+$"))]
    #[serde(
        default = "default_network_id",
        deserialize_with = "deserialize_network_id"
    )]
    pub network_id: String,

    /// Build/deploy command line, program first
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    /// Seconds before a running build is killed
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,

    /// API key sent to the block explorers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_api_key: Option<String>,

    /// Extra or replacement block explorer API URLs, keyed by network id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub explorers: BTreeMap<String, String>,

    /// Port of the push server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of a prebuilt UI served next to the push endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_dir: Option<PathBuf>,

    /// Open the browser when the server starts
    #[serde(default)]
    pub open: bool,
}

/// Accept the network id as a JSON string or number.
fn deserialize_network_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Number(n) => n.to_string(),
    })
}

impl Default for SolhmrConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            contracts_dir: default_contracts_dir(),
            build_dir: default_build_dir(),
            ledger: default_ledger(),
            network_id: default_network_id(),
            build_command: default_build_command(),
            build_timeout_secs: default_build_timeout_secs(),
            explorer_api_key: None,
            explorers: BTreeMap::new(),
            port: default_port(),
            ui_dir: None,
            open: false,
        }
    }
}

impl SolhmrConfig {
    /// Generate JSON Schema for solhmr.config.json.
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(SolhmrConfig);
        serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
    }

    /// Example solhmr.config.json content.
    pub fn example_config() -> String {
        let mut explorers = BTreeMap::new();
        explorers.insert(
            "5".to_string(),
            "https://api-goerli.etherscan.io/api".to_string(),
        );

        let example = Self {
            project_dir: PathBuf::from("solidity"),
            explorer_api_key: Some("YOUR_ETHERSCAN_KEY".to_string()),
            explorers,
            ui_dir: Some(PathBuf::from("dist")),
            ..Self::default()
        };
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }

    /// Resolve `path` against the project directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Paths the pipeline works on.
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout {
            project_dir: self.project_dir.clone(),
            contracts_dir: self.resolve(&self.contracts_dir),
            build_dir: self.resolve(&self.build_dir),
            ledger_path: self.resolve(&self.ledger),
            local_network_id: self.network_id.clone(),
        }
    }

    pub fn ui_path(&self) -> Option<PathBuf> {
        self.ui_dir.as_deref().map(|dir| self.resolve(dir))
    }

    pub fn build_command(&self) -> Result<BuildCommand> {
        let command = BuildCommand::from_argv(&self.build_command).ok_or_else(|| {
            ConfigError::MissingField {
                field: "buildCommand".to_string(),
                hint: "Provide the build tool command line, e.g. [\"truffle\", \"migrate\", \"--reset\"]"
                    .to_string(),
            }
        })?;
        Ok(command.with_timeout(Duration::from_secs(self.build_timeout_secs)))
    }

    /// Block explorer client for the built-in networks plus `explorers`.
    ///
    /// Entries in `explorers` replace the built-in URL for the same network.
    pub fn resolver(&self) -> Result<EtherscanResolver> {
        let mut explorers = default_explorers();
        explorers.extend(
            self.explorers
                .iter()
                .map(|(id, url)| (id.clone(), url.clone())),
        );
        Ok(EtherscanResolver::new(
            explorers,
            self.explorer_api_key.clone(),
        )?)
    }
}
