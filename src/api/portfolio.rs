use axum::extract::State;
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::api::{
    params::ToolParams,
    response::{ToolError, ToolResponse, ToolResult},
};
use crate::blockchain::{
    models::Network,
    services::{
        portfolio::{build_portfolio, fetch_portfolio},
        price::fetch_sui_price,
    },
    SuiClient,
};
use crate::utils::{network, require, sui_address};
use crate::AppState;

/// GET|POST /api/tools/sui-portfolio
pub async fn sui_portfolio_handler(
    State(state): State<AppState>,
    params: ToolParams,
) -> ToolResult {
    let user_address = require(&params, "userAddress", "User address")?;
    let network = network(&params, Network::Testnet)?;
    let include_prices = params.bool("includePrices");
    sui_address(&user_address, "user address")?;

    info!("Tracking portfolio of {} on {}", user_address, network);
    let package_id = state.config.nft_package_id.as_deref();
    let client = SuiClient::for_network(&state.config, network);
    let reads = fetch_portfolio(&client, &user_address, package_id)
        .await
        .map_err(ToolError::upstream("Failed to track portfolio"))?;

    // Prices only exist for mainnet SUI; a failed lookup leaves them out.
    let sui_price = if include_prices && network == Network::Mainnet {
        match fetch_sui_price(&state.http, &state.config.coingecko_api_url).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("Failed to fetch price data: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let portfolio = build_portfolio(&reads, package_id, sui_price.as_ref());
    let summary = &portfolio.summary;
    let message = format!(
        "Portfolio tracking complete for {}. Found {} objects: {} coin types, {} NFTs, {} other objects.",
        network,
        summary.total_objects,
        summary.total_coins,
        summary.total_nfts,
        summary.total_other_objects
    );

    Ok(ToolResponse::new(message).data(json!({
        "walletAddress": user_address,
        "network": network,
        "summary": portfolio.summary,
        "suiBalance": portfolio.sui_balance,
        "coins": portfolio.coins,
        "nfts": portfolio.nfts,
        "otherObjects": portfolio.other_objects,
        "priceData": sui_price.map(|price| json!({ "sui": price })),
        "lastUpdated": Utc::now().to_rfc3339(),
        "packageIds": {
            "nftPackageId": package_id,
            "marketplaceId": &state.config.nft_marketplace_id,
        },
    })))
}
