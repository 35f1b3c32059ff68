use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{
    params::ToolParams,
    response::{ToolError, ToolResult},
};
use crate::blockchain::{models::Network, services::balance::get_balance_summary, SuiClient};
use crate::utils::{network, require, sui_address};
use crate::AppState;

/// GET /api/tools/sui-balance
///
/// Answers with the bare balance object rather than the tool envelope.
pub async fn sui_balance_handler(
    State(state): State<AppState>,
    params: ToolParams,
) -> ToolResult<Json<Value>> {
    let address = require(&params, "address", "Address")?;
    let network = network(&params, Network::Devnet)?;
    sui_address(&address, "address")?;

    info!("Fetching balances of {} on {}", address, network);
    let client = SuiClient::for_network(&state.config, network);
    let summary = get_balance_summary(&client, &address)
        .await
        .map_err(ToolError::upstream("Failed to fetch balance"))?;

    Ok(Json(json!({
        "address": address,
        "network": network,
        "suiBalance": summary.sui_balance,
        "totalCoins": summary.total_coins,
        "coinTypes": summary.coin_types,
        "hasNextPage": summary.has_next_page,
    })))
}
