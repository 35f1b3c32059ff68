// src/config.rs

use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};

use crate::blockchain::models::Network;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
/// Matches the protocol's max transaction gas; only used for the estimating dry run.
pub const DEFAULT_MAX_GAS_BUDGET: u64 = 50_000_000_000;

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub host: String,
    pub port: u16,

    // Agent manifest settings
    pub account_id: String,
    pub base_url: String,

    /// Package ids of the deployed Move contracts. Endpoints that need one
    /// answer HTTP 500 when it is missing instead of failing at startup.
    pub nft_package_id: Option<String>,
    pub nft_marketplace_id: Option<String>,
    pub pet_package_id: Option<String>,

    // Upstream services
    pub sui_rpc_overrides: HashMap<Network, String>,
    pub coingecko_api_url: String,

    // Transaction settings
    pub max_gas_budget: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            account_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            nft_package_id: None,
            nft_marketplace_id: None,
            pet_package_id: None,
            sui_rpc_overrides: HashMap::new(),
            coingecko_api_url: DEFAULT_COINGECKO_API_URL.to_string(),
            max_gas_budget: DEFAULT_MAX_GAS_BUDGET,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Fullnode URL for a network, honouring any configured override.
    pub fn sui_rpc_url(&self, network: Network) -> String {
        self.sui_rpc_overrides
            .get(&network)
            .cloned()
            .unwrap_or_else(|| network.fullnode_url().to_string())
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let port = match non_empty_var("PORT") {
            Some(port) => port.parse().context("PORT must be a valid number")?,
            None => defaults.port,
        };

        let max_gas_budget = match non_empty_var("SUI_MAX_GAS_BUDGET") {
            Some(budget) => budget
                .parse()
                .context("SUI_MAX_GAS_BUDGET must be a valid number of MIST")?,
            None => defaults.max_gas_budget,
        };

        let mut sui_rpc_overrides = HashMap::new();
        for (network, key) in [
            (Network::Mainnet, "SUI_MAINNET_RPC_URL"),
            (Network::Testnet, "SUI_TESTNET_RPC_URL"),
            (Network::Devnet, "SUI_DEVNET_RPC_URL"),
        ] {
            if let Some(url) = non_empty_var(key) {
                sui_rpc_overrides.insert(network, url);
            }
        }

        // The pet contract has been deployed under several variable names.
        let pet_package_id = non_empty_var("PET_PACKAGE_ID")
            .or_else(|| non_empty_var("SUI_PACKAGE_ID"))
            .or_else(|| non_empty_var("NEXT_PUBLIC_PET_PACKAGE_ID"));

        Ok(Config {
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port,
            account_id: non_empty_var("ACCOUNT_ID").unwrap_or_default(),
            base_url: non_empty_var("NEXT_PUBLIC_BASE_URL").unwrap_or(defaults.base_url),
            nft_package_id: non_empty_var("NFT_PACKAGE_ID"),
            nft_marketplace_id: non_empty_var("NFT_MARKETPLACE_ID"),
            pet_package_id,
            sui_rpc_overrides,
            coingecko_api_url: non_empty_var("COINGECKO_API_URL")
                .unwrap_or(defaults.coingecko_api_url),
            max_gas_budget,
        })
    }
}
