// src/blockchain/rpc.rs

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response<T = Value> {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

impl Request {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Value::from(id),
            method: method.to_string(),
            params,
        }
    }
}

impl<T> Response<T> {
    /// Turns the envelope into the call result, surfacing RPC errors with
    /// their code and message.
    pub fn into_result(self, method: &str) -> Result<T> {
        if let Some(err) = self.error {
            return Err(anyhow!(
                "{} failed with RPC error {}: {}",
                method,
                err.code,
                err.message
            ));
        }
        self.result
            .ok_or_else(|| anyhow!("{} returned neither a result nor an error", method))
    }
}
