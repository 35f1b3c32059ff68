// src/blockchain/mod.rs

pub mod client;
pub mod models;
pub mod rpc;
pub mod services;
pub mod sui_types;
pub mod transaction;

pub use client::SuiClient;
pub use models::Network;
