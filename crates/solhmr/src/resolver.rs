//! Remote contract source resolution.
//!
//! Contracts recorded against a network other than the local chain are
//! looked up on an Etherscan-compatible block explorer: the verified source
//! and contract name come from `getsourcecode`, the deployed bytecode from
//! the `eth_getCode` proxy.

use crate::error::ResolverError;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Timeout applied to every block explorer request.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Source of a contract fetched from a remote network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub name: String,
    pub source: String,
    /// Hex bytecode without the `0x` prefix
    pub bytecode: String,
}

/// Looks up the canonical source of a deployed contract.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(
        &self,
        address: &str,
        network_id: &str,
    ) -> Result<RemoteSource, ResolverError>;
}

/// Known Etherscan API endpoints keyed by network id.
pub fn default_explorers() -> HashMap<String, String> {
    [
        ("1", "https://api.etherscan.io/api"),
        ("3", "https://api-ropsten.etherscan.io/api"),
        ("4", "https://api-rinkeby.etherscan.io/api"),
        ("5", "https://api-goerli.etherscan.io/api"),
        ("42", "https://api-kovan.etherscan.io/api"),
        ("17000", "https://api-holesky.etherscan.io/api"),
        ("11155111", "https://api-sepolia.etherscan.io/api"),
    ]
    .into_iter()
    .map(|(id, url)| (id.to_string(), url.to_string()))
    .collect()
}

/// Etherscan API response envelope.
///
/// `result` is an array on success and an error string when `status` is "0".
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

impl ApiResponse {
    fn rejected(&self) -> Option<String> {
        if self.status.as_deref() != Some("0") {
            return None;
        }
        let message = match &self.result {
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            _ => self.message.clone().unwrap_or_else(|| "NOTOK".to_string()),
        };
        Some(message)
    }
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    #[serde(rename = "SourceCode", default)]
    source_code: String,
    #[serde(rename = "ContractName", default)]
    contract_name: String,
}

/// Block explorer client for Etherscan and its testnet mirrors.
pub struct EtherscanResolver {
    client: Client,
    api_key: Option<String>,
    explorers: HashMap<String, Url>,
}

impl EtherscanResolver {
    /// Create a resolver for the given network id → API URL map.
    pub fn new(
        explorers: HashMap<String, String>,
        api_key: Option<String>,
    ) -> Result<Self, ResolverError> {
        let explorers = explorers
            .into_iter()
            .map(|(network_id, raw)| {
                Url::parse(&raw)
                    .map(|url| (network_id, url))
                    .map_err(|e| ResolverError::InvalidUrl {
                        url: raw.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            explorers,
        })
    }

    /// Resolver for the public Etherscan endpoints.
    pub fn with_defaults(api_key: Option<String>) -> Result<Self, ResolverError> {
        Self::new(default_explorers(), api_key)
    }

    fn endpoint(&self, network_id: &str) -> Result<&Url, ResolverError> {
        self.explorers
            .get(network_id)
            .ok_or_else(|| ResolverError::UnsupportedNetwork(network_id.to_string()))
    }

    async fn call(
        &self,
        endpoint: &Url,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse, ResolverError> {
        let mut request = self.client.get(endpoint.clone()).query(params);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("apikey", key.as_str())]);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<ApiResponse>().await?)
    }

    async fn fetch_source(
        &self,
        endpoint: &Url,
        address: &str,
        network_id: &str,
    ) -> Result<SourceEntry, ResolverError> {
        let response = self
            .call(
                endpoint,
                &[
                    ("module", "contract"),
                    ("action", "getsourcecode"),
                    ("address", address),
                ],
            )
            .await?;

        if let Some(message) = response.rejected() {
            return Err(ResolverError::Api {
                address: address.to_string(),
                network_id: network_id.to_string(),
                message,
            });
        }

        let entries: Vec<SourceEntry> =
            serde_json::from_value(response.result).map_err(|e| ResolverError::Api {
                address: address.to_string(),
                network_id: network_id.to_string(),
                message: format!("unexpected getsourcecode response: {}", e),
            })?;

        match entries.into_iter().next() {
            Some(entry) if !entry.source_code.is_empty() && !entry.contract_name.is_empty() => {
                Ok(entry)
            }
            _ => Err(ResolverError::Unverified {
                address: address.to_string(),
                network_id: network_id.to_string(),
            }),
        }
    }

    async fn fetch_bytecode(
        &self,
        endpoint: &Url,
        address: &str,
        network_id: &str,
    ) -> Result<String, ResolverError> {
        let response = self
            .call(
                endpoint,
                &[
                    ("module", "proxy"),
                    ("action", "eth_getCode"),
                    ("address", address),
                    ("tag", "latest"),
                ],
            )
            .await?;

        if let Some(message) = response.rejected() {
            return Err(ResolverError::Api {
                address: address.to_string(),
                network_id: network_id.to_string(),
                message,
            });
        }

        let code = response.result.as_str().unwrap_or_default();
        let code = code.strip_prefix("0x").unwrap_or(code);
        if code.is_empty() {
            return Err(ResolverError::NoBytecode {
                address: address.to_string(),
                network_id: network_id.to_string(),
            });
        }

        Ok(code.to_string())
    }
}

#[async_trait]
impl SourceResolver for EtherscanResolver {
    async fn resolve(
        &self,
        address: &str,
        network_id: &str,
    ) -> Result<RemoteSource, ResolverError> {
        let endpoint = self.endpoint(network_id)?;

        tracing::debug!("resolving {} on network {} via {}", address, network_id, endpoint);

        let entry = self.fetch_source(endpoint, address, network_id).await?;
        let bytecode = self.fetch_bytecode(endpoint, address, network_id).await?;

        Ok(RemoteSource {
            name: entry.contract_name,
            source: entry.source_code,
            bytecode,
        })
    }
}
