use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::api::{
    params::ToolParams,
    response::{ToolError, ToolResult},
};
use crate::blockchain::services::price::{clamp_limit, fetch_markets, DEFAULT_COINS};
use crate::AppState;

/// GET /api/tools/crypto-prices
pub async fn crypto_prices_handler(
    State(state): State<AppState>,
    params: ToolParams,
) -> ToolResult<Json<Value>> {
    let ids: Vec<String> = match params.str("coins") {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
        None => DEFAULT_COINS.iter().map(|id| id.to_string()).collect(),
    };
    let currency = params
        .str("currency")
        .unwrap_or_else(|| "usd".to_string())
        .to_lowercase();
    let limit = clamp_limit(params.str("limit").as_deref());

    info!("Fetching {} market quotes in {}", ids.len().min(limit), currency);
    let quotes = fetch_markets(&state.http, &state.config.coingecko_api_url, &ids, &currency, limit)
        .await
        .map_err(ToolError::upstream("Failed to fetch cryptocurrency prices"))?;

    Ok(Json(json!({
        "success": true,
        "count": quotes.len(),
        "data": quotes,
        "timestamp": Utc::now().to_rfc3339(),
        "currency": currency.to_uppercase(),
    })))
}
