//! JSON-RPC client for Sui fullnodes.
//!
//! A client is cheap to build and is constructed per request for the
//! network the caller picked. It only reads chain state; the transaction
//! builder uses it to resolve objects, price gas and dry-run.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::blockchain::{
    models::{Balance, CoinPage, DryRunResponse, Network, OwnedObject, Page, SuiObjectResponse},
    rpc::{Request, Response},
};
use crate::config::Config;

pub struct SuiClient {
    http: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl SuiClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            rpc_url: rpc_url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn for_network(config: &Config, network: Network) -> Self {
        Self::new(config.sui_rpc_url(network))
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("Sui RPC {} -> {}", method, self.rpc_url);

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&Request::new(id, method, params))
            .send()
            .await
            .with_context(|| format!("{method} request to {} failed", self.rpc_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{method} returned HTTP {status}: {body}");
        }

        let envelope: Response<T> = response
            .json()
            .await
            .with_context(|| format!("{method} returned an unexpected response"))?;
        envelope.into_result(method)
    }

    /// Total balance of one coin type (SUI when `coin_type` is `None`).
    pub async fn get_balance(&self, owner: &str, coin_type: Option<&str>) -> Result<Balance> {
        self.call("suix_getBalance", json!([owner, coin_type])).await
    }

    /// First page of every coin object the owner holds.
    pub async fn get_all_coins(&self, owner: &str) -> Result<CoinPage> {
        self.call("suix_getAllCoins", json!([owner, Value::Null, Value::Null]))
            .await
    }

    /// First page of coin objects of a single type.
    pub async fn get_coins(&self, owner: &str, coin_type: &str) -> Result<CoinPage> {
        self.call("suix_getCoins", json!([owner, coin_type, Value::Null, Value::Null]))
            .await
    }

    /// Owned objects, optionally restricted to one Move struct type.
    pub async fn get_owned_objects(
        &self,
        owner: &str,
        struct_type: Option<&str>,
    ) -> Result<Page<OwnedObject>> {
        let filter = struct_type.map(|t| json!({ "StructType": t }));
        let query = json!({
            "filter": filter,
            "options": {
                "showType": true,
                "showContent": true,
                "showDisplay": true
            }
        });
        let page: Page<SuiObjectResponse> = self
            .call("suix_getOwnedObjects", json!([owner, query, Value::Null, Value::Null]))
            .await?;

        Ok(Page {
            data: page
                .data
                .into_iter()
                .filter_map(|entry| entry.data)
                .map(OwnedObject::from)
                .collect(),
            next_cursor: page.next_cursor,
            has_next_page: page.has_next_page,
        })
    }

    /// Object references and owners, in the order requested.
    pub async fn multi_get_objects(&self, ids: &[String]) -> Result<Vec<SuiObjectResponse>> {
        self.call(
            "sui_multiGetObjects",
            json!([ids, { "showOwner": true, "showType": true }]),
        )
        .await
    }

    pub async fn get_reference_gas_price(&self) -> Result<u64> {
        let price: Value = self.call("suix_getReferenceGasPrice", json!([])).await?;
        match &price {
            Value::String(s) => s.parse().context("gas price is not an integer"),
            Value::Number(n) => n.as_u64().context("gas price is not an integer"),
            other => anyhow::bail!("unexpected gas price {other}"),
        }
    }

    pub async fn dry_run(&self, tx_bytes_base64: &str) -> Result<DryRunResponse> {
        self.call("sui_dryRunTransactionBlock", json!([tx_bytes_base64]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn reads_balance_over_json_rpc() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "suix_getBalance",
                "params": ["0xowner", "0x2::sui::SUI"]
            })))
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "coinType": "0x2::sui::SUI",
                        "coinObjectCount": 2,
                        "totalBalance": "1500000000",
                        "lockedBalance": {}
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SuiClient::new(server.url());
        let balance = client
            .get_balance("0xowner", Some("0x2::sui::SUI"))
            .await
            .unwrap();

        assert_eq!(balance.total_balance, 1_500_000_000);
        assert_eq!(balance.coin_object_count, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn propagates_rpc_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32602, "message": "Invalid Sui address" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SuiClient::new(server.url());
        let err = client.get_all_coins("0xnope").await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid Sui address"));
    }

    #[tokio::test]
    async fn parses_string_gas_price() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"750"}"#)
            .create_async()
            .await;

        let client = SuiClient::new(server.url());
        assert_eq!(client.get_reference_gas_price().await.unwrap(), 750);
    }
}
