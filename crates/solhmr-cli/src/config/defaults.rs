use std::path::PathBuf;

pub fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_contracts_dir() -> PathBuf {
    PathBuf::from("contracts")
}

pub fn default_build_dir() -> PathBuf {
    PathBuf::from("build/contracts")
}

pub fn default_ledger() -> PathBuf {
    PathBuf::from("deployments.json")
}

pub fn default_network_id() -> String {
    solhmr::LOCAL_NETWORK_ID.to_string()
}

pub fn default_build_command() -> Vec<String> {
    ["truffle", "migrate", "--reset"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_build_timeout_secs() -> u64 {
    solhmr::build::DEFAULT_BUILD_TIMEOUT_SECS
}

pub fn default_port() -> u16 {
    8080
}
