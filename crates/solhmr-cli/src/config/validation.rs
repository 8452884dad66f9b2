use crate::config::SolhmrConfig;
use crate::error::{ConfigError, Result};

impl SolhmrConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.build_command.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(ConfigError::MissingField {
                field: "buildCommand".to_string(),
                hint: "Provide the build tool command line, e.g. [\"truffle\", \"migrate\", \"--reset\"]"
                    .to_string(),
            }
            .into());
        }

        if self.build_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "buildTimeoutSecs".to_string(),
                value: "0".to_string(),
                hint: "Use a timeout of at least one second".to_string(),
            }
            .into());
        }

        if self.network_id.is_empty() || !self.network_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidValue {
                field: "networkId".to_string(),
                value: self.network_id.clone(),
                hint: "Network ids are decimal numbers, e.g. \"1337\"".to_string(),
            }
            .into());
        }

        for (network_id, raw) in &self.explorers {
            let valid = url::Url::parse(raw)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::InvalidValue {
                    field: format!("explorers.{}", network_id),
                    value: raw.clone(),
                    hint: "Use the explorer's HTTP API URL, e.g. https://api.etherscan.io/api"
                        .to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// Validate raw config file JSON against the generated schema.
///
/// Reports every violation, one per line.
pub fn validate_against_schema(instance: &serde_json::Value) -> Result<()> {
    let schema = SolhmrConfig::json_schema();
    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::ValidationFailed {
        errors: format!("invalid schema: {}", e),
    })?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("  - {}", e))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed {
            errors: errors.join("\n"),
        }
        .into())
    }
}
