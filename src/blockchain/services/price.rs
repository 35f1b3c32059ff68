//! Market data from the CoinGecko public API.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_COINS: [&str; 10] = [
    "bitcoin",
    "ethereum",
    "near",
    "binancecoin",
    "cardano",
    "solana",
    "polygon-ecosystem-token",
    "chainlink",
    "avalanche-2",
    "uniswap",
];
pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 50;

/// Raw `/coins/markets` entry. Any numeric field may be null.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u64>,
    pub price_change_percentage_24h: Option<f64>,
    #[serde(alias = "price_change_percentage_7d")]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    pub total_volume: Option<f64>,
    pub circulating_supply: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub rank: Option<u64>,
    pub change24h: Option<f64>,
    pub change7d: Option<f64>,
    pub volume24h: Option<f64>,
    pub supply: Option<f64>,
    pub currency: String,
}

impl MarketQuote {
    pub fn from_market(coin: MarketCoin, currency: &str) -> Self {
        Self {
            id: coin.id,
            symbol: coin.symbol.to_uppercase(),
            name: coin.name,
            price: coin.current_price,
            market_cap: coin.market_cap,
            rank: coin.market_cap_rank,
            change24h: coin.price_change_percentage_24h,
            change7d: coin.price_change_percentage_7d_in_currency,
            volume24h: coin.total_volume,
            supply: coin.circulating_supply,
            currency: currency.to_uppercase(),
        }
    }
}

/// Clamps a requested row count into `1..=MAX_LIMIT`.
pub fn clamp_limit(requested: Option<&str>) -> usize {
    requested
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT)
}

/// Market data for `ids`, at most `limit` of them.
pub async fn fetch_markets(
    http: &Client,
    api_url: &str,
    ids: &[String],
    currency: &str,
    limit: usize,
) -> Result<Vec<MarketQuote>> {
    let ids: Vec<&str> = ids.iter().map(String::as_str).take(limit).collect();
    let url = format!("{}/coins/markets", api_url.trim_end_matches('/'));
    let per_page = limit.to_string();

    let response = http
        .get(&url)
        .header("Accept", "application/json")
        .query(&[
            ("vs_currency", currency),
            ("ids", &ids.join(",")),
            ("order", "market_cap_desc"),
            ("per_page", &per_page),
            ("page", "1"),
            ("sparkline", "false"),
            ("price_change_percentage", "24h,7d"),
        ])
        .send()
        .await
        .context("CoinGecko request failed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("CoinGecko API error: {}", status.as_u16()));
    }

    let coins: Vec<MarketCoin> = response
        .json()
        .await
        .context("CoinGecko returned an unexpected body")?;
    Ok(coins
        .into_iter()
        .map(|coin| MarketQuote::from_market(coin, currency))
        .collect())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuiPrice {
    pub usd: f64,
    pub last_updated: String,
}

/// Current SUI/USD price from `/simple/price`.
pub async fn fetch_sui_price(http: &Client, api_url: &str) -> Result<SuiPrice> {
    let url = format!("{}/simple/price", api_url.trim_end_matches('/'));
    let response = http
        .get(&url)
        .header("Accept", "application/json")
        .query(&[
            ("ids", "sui"),
            ("vs_currencies", "usd"),
            ("include_last_updated_at", "true"),
        ])
        .send()
        .await
        .context("CoinGecko request failed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("CoinGecko API error: {}", status.as_u16()));
    }

    let body: Value = response.json().await?;
    let usd = body["sui"]["usd"]
        .as_f64()
        .ok_or_else(|| anyhow!("CoinGecko response has no SUI price"))?;
    let updated: DateTime<Utc> = body["sui"]["last_updated_at"]
        .as_i64()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(SuiPrice {
        usd,
        last_updated: updated.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some("0")), 1);
        assert_eq!(clamp_limit(Some("500")), 50);
        assert_eq!(clamp_limit(Some("abc")), 10);
        assert_eq!(clamp_limit(Some("3")), 3);
    }

    #[tokio::test]
    async fn formats_market_quotes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("vs_currency".into(), "eur".into()),
                Matcher::UrlEncoded("ids".into(), "bitcoin,near".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(
                json!([{
                    "id": "bitcoin",
                    "symbol": "btc",
                    "name": "Bitcoin",
                    "current_price": 61000.5,
                    "market_cap": 1.2e12,
                    "market_cap_rank": 1,
                    "price_change_percentage_24h": -1.2,
                    "price_change_percentage_7d_in_currency": 3.4,
                    "total_volume": 2.5e10,
                    "circulating_supply": 19700000.0
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let ids = vec!["bitcoin".to_string(), "near".to_string(), "solana".to_string()];
        let quotes = fetch_markets(&Client::new(), &server.url(), &ids, "eur", 2)
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "BTC");
        assert_eq!(quotes[0].currency, "EUR");
        assert_eq!(quotes[0].rank, Some(1));
        assert_eq!(quotes[0].change7d, Some(3.4));
    }

    #[tokio::test]
    async fn reports_http_status_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let err = fetch_sui_price(&Client::new(), &server.url()).await.unwrap_err();
        assert_eq!(err.to_string(), "CoinGecko API error: 429");
    }
}
