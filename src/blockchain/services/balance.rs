use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::amount::{format_base_units_fixed, SUI_DECIMALS};
use crate::blockchain::{
    client::SuiClient,
    models::{Coin, CoinPage},
    sui_types::SUI_COIN_TYPE,
};

use super::swap::token_symbol;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoinTypeSummary {
    pub coin_type: String,
    pub balance: String,
    pub raw_balance: String,
    pub count: usize,
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub sui_balance: String,
    pub total_coins: usize,
    pub coin_types: Vec<CoinTypeSummary>,
    pub has_next_page: bool,
}

/// Coins grouped by type, in coin type order.
pub fn group_by_type(coins: &[Coin]) -> BTreeMap<&str, Vec<&Coin>> {
    let mut groups: BTreeMap<&str, Vec<&Coin>> = BTreeMap::new();
    for coin in coins {
        groups.entry(coin.coin_type.as_str()).or_default().push(coin);
    }
    groups
}

pub fn summarize_coins(total_sui: u128, page: &CoinPage) -> BalanceSummary {
    let coin_types = group_by_type(&page.data)
        .into_iter()
        .map(|(coin_type, coins)| {
            let raw: u128 = coins.iter().map(|c| c.balance).sum();
            let balance = if coin_type == SUI_COIN_TYPE {
                format_base_units_fixed(raw, SUI_DECIMALS, 6)
            } else {
                raw.to_string()
            };
            CoinTypeSummary {
                coin_type: coin_type.to_string(),
                balance,
                raw_balance: raw.to_string(),
                count: coins.len(),
                symbol: token_symbol(coin_type),
            }
        })
        .collect();

    BalanceSummary {
        sui_balance: format_base_units_fixed(total_sui, SUI_DECIMALS, 6),
        total_coins: page.data.len(),
        coin_types,
        has_next_page: page.has_next_page,
    }
}

/// SUI balance plus a per-type breakdown of the first page of coins.
pub async fn get_balance_summary(client: &SuiClient, address: &str) -> Result<BalanceSummary> {
    let balance = client
        .get_balance(address, Some(SUI_COIN_TYPE))
        .await
        .context("Failed to fetch balance")?;
    let coins = client
        .get_all_coins(address)
        .await
        .context("Failed to fetch coins")?;
    Ok(summarize_coins(balance.total_balance, &coins))
}
