// src/lib.rs

pub mod amount;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Shared HTTP client for non-Sui upstreams (CoinGecko)
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}
