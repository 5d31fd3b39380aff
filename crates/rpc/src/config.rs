//! Application configuration
//!
//! TOML file plus `CREDBANK_*` environment overrides. Credit packages are
//! served configuration for clients; the ledger engine never reads them
//! (pricing is the payment flow's concern, not the ledger's).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub chain: ChainConfig,
    /// Credit packages offered to clients (display data only)
    pub packages: Vec<CreditPackage>,
}

/// Which ledger store backs the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Memory,
    Sqlite { url: String },
}

/// On-chain payment verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// When false, no verifier backend is wired and no payment can verify.
    pub enabled: bool,
    pub rpc_url: String,
    pub chain_id: u64,
    /// Credits contract payments must be addressed to
    pub contract_address: String,
    /// On-chain price of one credit, in wei
    pub wei_per_credit: u64,
}

/// A purchasable credit bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPackage {
    pub credits: u64,
    pub price_wei: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::Sqlite {
                url: "sqlite:credbank.db".to_string(),
            },
            chain: ChainConfig::default(),
            packages: vec![
                CreditPackage {
                    credits: 10,
                    price_wei: 1_000_000_000_000_000,
                },
                CreditPackage {
                    credits: 50,
                    price_wei: 4_500_000_000_000_000,
                },
                CreditPackage {
                    credits: 100,
                    price_wei: 8_000_000_000_000_000,
                },
            ],
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "https://evmrpc-testnet.0g.ai".to_string(),
            chain_id: 16602,
            contract_address: "0x5FaADBd9203Bc599B71bb789BD59ca9127a87caC".to_string(),
            wei_per_credit: 100_000_000_000_000,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file (defaults when `path` is None), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config: AppConfig = match path {
            Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CREDBANK_RPC_URL") {
            self.chain.rpc_url = url;
        }
        if let Ok(address) = std::env::var("CREDBANK_CONTRACT_ADDRESS") {
            self.chain.contract_address = address;
        }
        if let Ok(url) = std::env::var("CREDBANK_DATABASE_URL") {
            self.storage = StorageConfig::Sqlite { url };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(!config.chain.enabled);
        assert_eq!(config.chain.chain_id, 16602);
        assert_eq!(config.packages.len(), 3);
        assert!(matches!(config.storage, StorageConfig::Sqlite { .. }));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [storage]
            backend = "memory"

            [chain]
            enabled = true
            rpc_url = "http://localhost:8545"
            "#,
        )
        .unwrap();

        assert!(matches!(config.storage, StorageConfig::Memory));
        assert!(config.chain.enabled);
        assert_eq!(config.chain.rpc_url, "http://localhost:8545");
        // unspecified sections keep their defaults
        assert_eq!(config.chain.chain_id, 16602);
        assert_eq!(config.packages.len(), 3);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let rendered = toml::to_string(&config).unwrap();
        let back: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(back.chain.contract_address, config.chain.contract_address);
    }
}
