//! # Ledger Networks
//!
//! Configured ledger networks and the registry used to look them up by name.
//! A network is fixed for the life of the process once loaded.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// Environment variable holding a JSON-encoded [`LedgerConfig`].
pub const CONFIG_ENV: &str = "LEDGER_VDR_CONFIG";

/// A named ledger endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Network name. Also the DID method segment: `did:<name>:<id>`.
    #[serde(alias = "network")]
    pub name: String,

    /// Base URL of the ledger's REST transaction API.
    pub base_url: String,

    /// Value sent verbatim in the `Authorization` header, e.g. `Bearer ...`.
    #[serde(alias = "token")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl NetworkConfig {
    /// Create a network configuration without credentials.
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Set the token sent in the `Authorization` header.
    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Static configuration supplied by the host at construction time.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Ordered list of networks. The first entry is the default network.
    pub networks: Vec<NetworkConfig>,

    /// Upper bound, in seconds, for each ledger HTTP call. No bound when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl LedgerConfig {
    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the JSON does not describe a
    /// configuration or a network entry is incomplete.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("issue parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the [`CONFIG_ENV`] environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the variable is unset or holds
    /// invalid configuration.
    pub fn from_env() -> Result<Self> {
        let json = std::env::var(CONFIG_ENV)
            .map_err(|e| Error::InvalidConfig(format!("{CONFIG_ENV}: {e}")))?;
        Self::from_json(&json)
    }

    /// Per-request timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        for network in &self.networks {
            if network.name.is_empty() {
                return Err(Error::InvalidConfig("network name is empty".into()));
            }
            if network.name.contains(':') {
                return Err(Error::InvalidConfig(format!(
                    "network name '{}' contains ':'",
                    network.name
                )));
            }
            if network.base_url.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "network '{}' has no base URL",
                    network.name
                )));
            }
        }
        Ok(())
    }
}

/// Read-only set of configured networks.
#[derive(Clone, Debug, Default)]
pub struct NetworkRegistry {
    networks: Vec<NetworkConfig>,
}

impl NetworkRegistry {
    /// Create a registry from an ordered list of networks.
    #[must_use]
    pub const fn new(networks: Vec<NetworkConfig>) -> Self {
        Self { networks }
    }

    /// Look up a network by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NetworkNotFound`] when no network has that name.
    pub fn resolve(&self, name: &str) -> Result<&NetworkConfig> {
        self.networks
            .iter()
            .find(|n| n.name == name)
            .ok_or_else(|| Error::NetworkNotFound(name.to_string()))
    }

    /// The first configured network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationEmpty`] when no networks are configured.
    pub fn default_network(&self) -> Result<&NetworkConfig> {
        self.networks.first().ok_or(Error::ConfigurationEmpty)
    }

    /// Names of all configured networks, in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.networks.iter().map(|n| n.name.as_str())
    }
}

impl From<&LedgerConfig> for NetworkRegistry {
    fn from(config: &LedgerConfig) -> Self {
        Self::new(config.networks.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn registry() -> NetworkRegistry {
        NetworkRegistry::new(vec![
            NetworkConfig::new("testnet", "http://ledger").auth_token("T"),
            NetworkConfig::new("devnet", "http://dev-ledger"),
        ])
    }

    #[test]
    fn resolve_by_name() {
        let registry = registry();
        let network = registry.resolve("devnet").expect("should resolve");
        assert_eq!(network.base_url, "http://dev-ledger");
        assert_eq!(network.auth_token, None);
    }

    #[test]
    fn resolve_is_exact() {
        let err = registry().resolve("TestNet").expect_err("should not resolve");
        assert_eq!(err, Error::NetworkNotFound("TestNet".into()));
    }

    #[test]
    fn default_is_first() {
        let registry = registry();
        assert_eq!(registry.default_network().expect("should have default").name, "testnet");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["testnet", "devnet"]);
    }

    #[test]
    fn empty_registry() {
        let err = NetworkRegistry::default().default_network().expect_err("should be empty");
        assert_eq!(err, Error::ConfigurationEmpty);
    }

    #[test]
    fn config_accepts_field_aliases() {
        let config = LedgerConfig::from_json(
            r#"{"networks":[{"network":"testnet","baseUrl":"http://localhost:8000","token":"Bearer abc"}]}"#,
        )
        .expect("should parse");

        assert_eq!(
            config.networks,
            vec![NetworkConfig::new("testnet", "http://localhost:8000").auth_token("Bearer abc")]
        );
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn config_timeout() {
        let config = LedgerConfig::from_json(
            r#"{"networks":[{"name":"testnet","baseUrl":"http://ledger"}],"timeoutSecs":5}"#,
        )
        .expect("should parse");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn config_rejects_colon_in_name() {
        let err = LedgerConfig::from_json(r#"{"networks":[{"name":"fabric:test","baseUrl":"http://ledger"}]}"#)
            .expect_err("should fail");
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn config_rejects_missing_url() {
        let err = LedgerConfig::from_json(r#"{"networks":[{"name":"testnet","baseUrl":""}]}"#)
            .expect_err("should fail");
        assert_eq!(err.code(), "invalid_config");
    }
}
