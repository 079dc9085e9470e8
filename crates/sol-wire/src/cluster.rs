//! RPC cluster selection and endpoint URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SolError;

/// Public RPC clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// Name as used in RPC endpoints and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }

    /// RPC API URL of this cluster.
    pub fn api_url(&self, tls: bool) -> &'static str {
        match (self, tls) {
            (Cluster::Devnet, true) => "https://api.devnet.solana.com",
            (Cluster::Devnet, false) => "http://api.devnet.solana.com",
            (Cluster::Testnet, true) => "https://api.testnet.solana.com",
            (Cluster::Testnet, false) => "http://api.testnet.solana.com",
            (Cluster::MainnetBeta, true) => "https://api.mainnet-beta.solana.com/",
            (Cluster::MainnetBeta, false) => "http://api.mainnet-beta.solana.com/",
        }
    }
}

impl FromStr for Cluster {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" => Ok(Cluster::MainnetBeta),
            other => Err(SolError::UnknownCluster(other.to_string())),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which cluster to talk to and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub cluster: Cluster,
    #[serde(default = "default_tls")]
    pub tls: bool,
}

fn default_tls() -> bool {
    true
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            tls: default_tls(),
        }
    }
}

impl ClusterConfig {
    pub fn api_url(&self) -> &'static str {
        self.cluster.api_url(self.tls)
    }
}

/// RPC API URL for `cluster`, devnet when unset.
pub fn cluster_api_url(cluster: Option<Cluster>, tls: bool) -> &'static str {
    cluster.unwrap_or_default().api_url(tls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_devnet_over_tls() {
        assert_eq!(cluster_api_url(None, true), "https://api.devnet.solana.com");
        assert_eq!(
            cluster_api_url(Some(Cluster::Devnet), true),
            "https://api.devnet.solana.com"
        );
        assert_eq!(ClusterConfig::default().api_url(), "https://api.devnet.solana.com");
    }

    #[test]
    fn plain_http_urls() {
        assert_eq!(
            cluster_api_url(Some(Cluster::Devnet), false),
            "http://api.devnet.solana.com"
        );
        assert_eq!(
            cluster_api_url(Some(Cluster::Testnet), false),
            "http://api.testnet.solana.com"
        );
        assert_eq!(
            cluster_api_url(Some(Cluster::MainnetBeta), false),
            "http://api.mainnet-beta.solana.com/"
        );
    }

    #[test]
    fn mainnet_url_keeps_trailing_slash() {
        assert_eq!(
            cluster_api_url(Some(Cluster::MainnetBeta), true),
            "https://api.mainnet-beta.solana.com/"
        );
    }

    #[test]
    fn parse_names() {
        for cluster in [Cluster::Devnet, Cluster::Testnet, Cluster::MainnetBeta] {
            assert_eq!(cluster.name().parse::<Cluster>().unwrap(), cluster);
            assert_eq!(cluster.to_string(), cluster.name());
        }
    }

    #[test]
    fn unknown_name_fails() {
        let err = "localnet".parse::<Cluster>().unwrap_err();
        assert_eq!(err, SolError::UnknownCluster("localnet".into()));
        assert_eq!(err.to_string(), "unknown cluster: localnet");
    }

    #[test]
    fn config_from_json_with_defaults() {
        let config: ClusterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClusterConfig::default());

        let config: ClusterConfig =
            serde_json::from_str(r#"{"cluster":"mainnet-beta","tls":false}"#).unwrap();
        assert_eq!(config.cluster, Cluster::MainnetBeta);
        assert_eq!(config.api_url(), "http://api.mainnet-beta.solana.com/");
    }

    #[test]
    fn config_rejects_unknown_cluster() {
        let result: Result<ClusterConfig, _> = serde_json::from_str(r#"{"cluster":"localnet"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Cluster::MainnetBeta).unwrap(),
            "\"mainnet-beta\""
        );
    }
}
