//! Quoter configuration

use anyhow::{Context, Result};
use rayswap_amm::{Cluster, LayoutKind};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// A pool to watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Pool account address (base58)
    pub address: String,

    /// "legacy" or "cpmm"
    pub layout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoterConfig {
    /// RPC URL for Solana cluster
    pub rpc_url: String,

    /// "mainnet" or "devnet"; selects the expected program ids
    pub cluster: String,

    /// Pools to resolve every tick
    pub pools: Vec<PoolEntry>,

    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Base-token amount (raw units) quoted each tick
    pub sample_amount: u64,

    /// Slippage tolerance applied to the sample quote
    pub slippage_bps: u64,

    /// Fetch CPMM fee configs (required for CPMM quotes)
    pub fetch_config: bool,
}

impl QuoterConfig {
    /// Load configuration from the TOML file named by `QUOTER_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("QUOTER_CONFIG")
            .unwrap_or_else(|_| "quoter-config.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: QuoterConfig = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Create default configuration
    pub fn default_devnet() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            cluster: "devnet".to_string(),
            pools: Vec::new(),
            poll_interval_secs: 10,
            sample_amount: 1_000_000_000, // 1 token at 9 decimals
            slippage_bps: 50,
            fetch_config: true,
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_devnet();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }

    pub fn cluster(&self) -> Result<Cluster> {
        Cluster::from_str(&self.cluster).map_err(anyhow::Error::msg)
    }

    /// Parsed pool addresses with their layouts, in configured order
    pub fn pool_targets(&self) -> Result<Vec<(Pubkey, LayoutKind)>> {
        self.pools
            .iter()
            .map(|entry| {
                let address = Pubkey::from_str(&entry.address)
                    .context(format!("Invalid pool address: {}", entry.address))?;
                let layout = LayoutKind::from_str(&entry.layout)
                    .context(format!("Invalid layout for pool {}", entry.address))?;
                Ok((address, layout))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = QuoterConfig::default_devnet();
        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(config.cluster().unwrap(), Cluster::Devnet);
        assert!(config.pools.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let pool = Pubkey::new_unique();
        let toml_str = format!(
            r#"
            rpc_url = "http://127.0.0.1:8899"
            cluster = "mainnet"
            poll_interval_secs = 5
            sample_amount = 1000
            slippage_bps = 100
            fetch_config = false

            [[pools]]
            address = "{}"
            layout = "cpmm"
            "#,
            pool
        );
        let config: QuoterConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.cluster().unwrap(), Cluster::Mainnet);
        assert_eq!(config.pool_targets().unwrap(), vec![(pool, LayoutKind::Cpmm)]);
    }

    #[test]
    fn test_write_and_load_default() {
        let path = std::env::temp_dir().join(format!("quoter-config-{}.toml", std::process::id()));
        let path = path.to_str().unwrap();

        QuoterConfig::write_default(path).unwrap();
        let config = QuoterConfig::load_from(path).unwrap();
        std::fs::remove_file(path).unwrap();

        assert_eq!(config.slippage_bps, QuoterConfig::default_devnet().slippage_bps);
    }

    #[test]
    fn test_invalid_entries() {
        let mut config = QuoterConfig::default_devnet();
        config.pools.push(PoolEntry {
            address: "not-a-key".to_string(),
            layout: "cpmm".to_string(),
        });
        assert!(config.pool_targets().is_err());

        config.pools[0].address = Pubkey::new_unique().to_string();
        config.pools[0].layout = "clmm".to_string();
        assert!(config.pool_targets().is_err());

        config.cluster = "localnet".to_string();
        assert!(config.cluster().is_err());
    }
}
