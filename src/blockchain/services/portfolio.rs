//! Wallet-wide holdings: SUI, every coin type, marketplace NFTs and other objects.

use std::collections::BTreeMap;

use anyhow::Result;
use futures::try_join;
use serde::Serialize;
use serde_json::Value;

use crate::amount::{base_units_to_f64, mist_to_sui};
use crate::blockchain::{
    client::SuiClient,
    models::{Balance, CoinPage, OwnedObject, Page},
    sui_types::SUI_COIN_TYPE,
};

use super::balance::group_by_type;
use super::nft::{nft_struct_type, NftSummary};
use super::price::SuiPrice;
use super::swap::token_decimals;

pub const MAX_OTHER_OBJECTS: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSuiBalance {
    pub balance: String,
    pub balance_in_sui: f64,
    pub coin_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeldCoin {
    pub coin_object_id: String,
    pub balance: String,
    pub balance_formatted: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoinHoldings {
    pub coin_type: String,
    pub total_balance: String,
    pub balance_formatted: f64,
    pub coin_count: usize,
    pub coins: Vec<HeldCoin>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtherObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub version: u64,
    pub has_public_transfer: bool,
    pub display: Option<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_objects: usize,
    pub total_coins: usize,
    pub total_nfts: usize,
    pub total_other_objects: usize,
    pub estimated_usd_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub summary: PortfolioSummary,
    pub sui_balance: PortfolioSuiBalance,
    pub coins: BTreeMap<String, CoinHoldings>,
    pub nfts: Vec<NftSummary>,
    pub other_objects: Vec<OtherObject>,
}

/// The four raw reads a portfolio is assembled from.
pub struct PortfolioReads {
    pub sui_balance: Balance,
    pub all_coins: CoinPage,
    pub owned_objects: Page<OwnedObject>,
    pub package_nfts: Page<OwnedObject>,
}

/// Issues all reads concurrently; any failure fails the whole portfolio.
pub async fn fetch_portfolio(
    client: &SuiClient,
    owner: &str,
    nft_package_id: Option<&str>,
) -> Result<PortfolioReads> {
    let nft_type = nft_package_id.map(nft_struct_type);
    let package_nfts = async {
        match &nft_type {
            Some(nft_type) => client.get_owned_objects(owner, Some(nft_type.as_str())).await,
            None => Ok(Page {
                data: Vec::new(),
                next_cursor: None,
                has_next_page: false,
            }),
        }
    };

    let (sui_balance, all_coins, owned_objects, package_nfts) = try_join!(
        client.get_balance(owner, Some(SUI_COIN_TYPE)),
        client.get_all_coins(owner),
        client.get_owned_objects(owner, None),
        package_nfts
    )?;

    Ok(PortfolioReads {
        sui_balance,
        all_coins,
        owned_objects,
        package_nfts,
    })
}

fn group_coins(page: &CoinPage) -> BTreeMap<String, CoinHoldings> {
    group_by_type(&page.data)
        .into_iter()
        .map(|(coin_type, coins)| {
            let decimals = token_decimals(coin_type);
            let total: u128 = coins.iter().map(|c| c.balance).sum();
            let holdings = CoinHoldings {
                coin_type: coin_type.to_string(),
                total_balance: total.to_string(),
                balance_formatted: base_units_to_f64(total, decimals),
                coin_count: coins.len(),
                coins: coins
                    .iter()
                    .map(|coin| HeldCoin {
                        coin_object_id: coin.coin_object_id.clone(),
                        balance: coin.balance.to_string(),
                        balance_formatted: base_units_to_f64(coin.balance, decimals),
                    })
                    .collect(),
            };
            (coin_type.to_string(), holdings)
        })
        .collect()
}

fn is_other_object(object: &OwnedObject, nft_type: Option<&str>) -> bool {
    if object.object_type.contains("::coin::Coin") {
        return false;
    }
    !matches!(nft_type, Some(nft_type) if object.object_type.contains(nft_type))
}

/// Aggregates the raw reads. `sui_price` adds the USD estimate when present.
pub fn build_portfolio(
    reads: &PortfolioReads,
    nft_package_id: Option<&str>,
    sui_price: Option<&SuiPrice>,
) -> Portfolio {
    let nft_type = nft_package_id.map(nft_struct_type);
    let coins = group_coins(&reads.all_coins);
    let nfts: Vec<NftSummary> = reads
        .package_nfts
        .data
        .iter()
        .filter_map(NftSummary::from_object)
        .collect();

    let others: Vec<OtherObject> = reads
        .owned_objects
        .data
        .iter()
        .filter(|object| is_other_object(object, nft_type.as_deref()))
        .map(|object| OtherObject {
            id: object.object_id.clone(),
            object_type: object.object_type.clone(),
            version: object.version,
            has_public_transfer: object.has_public_transfer,
            display: object.display.clone(),
        })
        .collect();

    let balance_in_sui = mist_to_sui(reads.sui_balance.total_balance);
    let estimated_usd_value = sui_price
        .map(|price| balance_in_sui * price.usd)
        .filter(|value| *value > 0.0)
        .map(|value| format!("{value:.2}"));

    Portfolio {
        summary: PortfolioSummary {
            total_objects: reads.owned_objects.data.len(),
            total_coins: coins.len(),
            total_nfts: nfts.len(),
            total_other_objects: others.len(),
            estimated_usd_value,
        },
        sui_balance: PortfolioSuiBalance {
            balance: reads.sui_balance.total_balance.to_string(),
            balance_in_sui,
            coin_count: reads.sui_balance.coin_object_count,
        },
        coins,
        nfts,
        other_objects: others.into_iter().take(MAX_OTHER_OBJECTS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::models::Coin;

    fn object(id: &str, object_type: &str) -> OwnedObject {
        OwnedObject {
            object_id: id.to_string(),
            object_type: object_type.to_string(),
            version: 1,
            fields: None,
            has_public_transfer: true,
            display: None,
        }
    }

    fn empty<T>() -> Page<T> {
        Page {
            data: Vec::new(),
            next_cursor: None,
            has_next_page: false,
        }
    }

    fn reads(objects: Vec<OwnedObject>) -> PortfolioReads {
        PortfolioReads {
            sui_balance: Balance {
                coin_type: SUI_COIN_TYPE.to_string(),
                coin_object_count: 2,
                total_balance: 2_000_000_000,
            },
            all_coins: Page {
                data: vec![
                    Coin {
                        coin_type: SUI_COIN_TYPE.to_string(),
                        coin_object_id: "0xc1".to_string(),
                        version: 1,
                        digest: "d".to_string(),
                        balance: 1_500_000_000,
                    },
                    Coin {
                        coin_type: SUI_COIN_TYPE.to_string(),
                        coin_object_id: "0xc2".to_string(),
                        version: 1,
                        digest: "d".to_string(),
                        balance: 500_000_000,
                    },
                ],
                next_cursor: None,
                has_next_page: false,
            },
            owned_objects: Page {
                data: objects,
                next_cursor: None,
                has_next_page: false,
            },
            package_nfts: empty(),
        }
    }

    #[test]
    fn separates_coins_nfts_and_other_objects() {
        let objects = vec![
            object("0xc1", "0x2::coin::Coin<0x2::sui::SUI>"),
            object("0xn1", "0x5::simple_nft::NFT"),
            object("0xk1", "0x2::kiosk::KioskOwnerCap"),
        ];
        let portfolio = build_portfolio(&reads(objects), Some("0x5"), None);

        assert_eq!(portfolio.summary.total_objects, 3);
        assert_eq!(portfolio.summary.total_coins, 1);
        assert_eq!(portfolio.summary.total_other_objects, 1);
        assert_eq!(portfolio.other_objects[0].id, "0xk1");
        assert_eq!(portfolio.summary.estimated_usd_value, None);

        let sui = &portfolio.coins[SUI_COIN_TYPE];
        assert_eq!(sui.total_balance, "2000000000");
        assert_eq!(sui.coin_count, 2);
        assert_eq!(sui.balance_formatted, 2.0);
    }

    #[test]
    fn truncates_other_objects_and_prices_sui() {
        let objects = (0..15)
            .map(|i| object(&format!("0x{i:02}"), "0x9::thing::Thing"))
            .collect();
        let price = SuiPrice {
            usd: 1.25,
            last_updated: "2024-01-01T00:00:00+00:00".to_string(),
        };
        let portfolio = build_portfolio(&reads(objects), None, Some(&price));

        assert_eq!(portfolio.summary.total_other_objects, 15);
        assert_eq!(portfolio.other_objects.len(), MAX_OTHER_OBJECTS);
        assert_eq!(portfolio.summary.estimated_usd_value.as_deref(), Some("2.50"));
    }
}
