//! `solhmr check`: validate configuration and project layout.

use crate::cli::CheckArgs;
use crate::config::{validate_against_schema, SolhmrConfig};
use crate::error::{ConfigError, Result, ResultExt};
use crate::ui;
use solhmr::DeploymentLedger;

/// Execute the check command.
///
/// 1. Validate the config file, if any, against the JSON schema
/// 2. Load the merged configuration and check its values
/// 3. Check the contracts directory exists and the ledger parses
/// 4. Check every remote ledger entry has a block explorer
pub async fn execute(args: CheckArgs) -> Result<()> {
    if args.schema {
        let schema = serde_json::to_string_pretty(&SolhmrConfig::json_schema())?;
        println!("{}", schema);
        return Ok(());
    }

    ui::info("Checking configuration...");
    match SolhmrConfig::config_file(&args.project)? {
        Some(path) => {
            let content = std::fs::read_to_string(&path).with_path(&path)?;
            let raw: serde_json::Value =
                serde_json::from_str(&content).map_err(ConfigError::InvalidJson)?;
            validate_against_schema(&raw)?;
            ui::success(&format!("{} matches the schema", path.display()));
        }
        None => ui::warning("No solhmr.config.json found, using defaults"),
    }

    let config = SolhmrConfig::load(&args.project)?;
    config.build_command()?;
    ui::success("Configuration is valid");

    let layout = config.layout();
    if !layout.contracts_dir.is_dir() {
        return Err(ConfigError::InvalidValue {
            field: "contractsDir".to_string(),
            value: layout.contracts_dir.display().to_string(),
            hint: "The contracts directory must exist before it can be watched".to_string(),
        }
        .into());
    }
    ui::success(&format!(
        "Contracts directory {} exists",
        layout.contracts_dir.display()
    ));

    let ledger = DeploymentLedger::load(&layout.ledger_path).await?;
    ui::success(&format!(
        "Ledger {} has {} entr{}",
        layout.ledger_path.display(),
        ledger.len(),
        if ledger.len() == 1 { "y" } else { "ies" }
    ));

    let mut known = solhmr::resolver::default_explorers();
    known.extend(config.explorers.clone());
    let mut missing = 0;
    for (name, record) in ledger.remote_entries(&layout.local_network_id) {
        if !known.contains_key(&record.network_id) {
            missing += 1;
            ui::warning(&format!(
                "{} is deployed on network {}, which has no block explorer configured",
                name, record.network_id
            ));
        }
    }

    if missing > 0 {
        ui::warning("The next pass will fail until those networks are added to \"explorers\"");
    } else {
        ui::success("All checks passed!");
    }
    Ok(())
}
