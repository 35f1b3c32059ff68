use axum::extract::State;
use tracing::info;

use crate::amount::{Rounding, ETH_DECIMALS};
use crate::api::{
    params::ToolParams,
    response::{ErrorBody, ToolError, ToolResponse, ToolResult},
};
use crate::blockchain::services::transfer::{
    eth_sign_request, evm_transfer_request, SignMethod, DEFAULT_SIGN_CHAIN_ID,
    DEFAULT_SIGN_MESSAGE,
};
use crate::utils::{base_units, positive_amount, require};
use crate::AppState;

const DEFAULT_TRANSFER_CHAIN_ID: u64 = 1;

fn chain_id(params: &ToolParams, default: u64) -> ToolResult<u64> {
    match params.str("chainId") {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            ToolError::BadRequest(
                ErrorBody::new("Invalid chainId. Must be a positive integer")
                    .details(format!("Received '{raw}'")),
            )
        }),
    }
}

fn invalid_address(e: anyhow::Error) -> ToolError {
    ToolError::BadRequest(ErrorBody::new("Invalid EVM address").details(e.to_string()))
}

/// GET /api/tools/create-evm-transaction
pub async fn create_evm_transaction_handler(
    State(_state): State<AppState>,
    params: ToolParams,
) -> ToolResult {
    let to = require(&params, "to", "Recipient address")?;
    let raw_amount = require(&params, "amount", "Amount")?;
    let amount = positive_amount(&raw_amount, "Invalid amount. Must be a positive number")?;
    let chain_id = chain_id(&params, DEFAULT_TRANSFER_CHAIN_ID)?;

    let wei = base_units(
        &amount,
        ETH_DECIMALS,
        Rounding::Floor,
        "Invalid amount. Must be a positive number",
    )?;
    let from = params.str("from");
    let request = evm_transfer_request(&to, wei, from.as_deref()).map_err(invalid_address)?;

    info!("Creating EVM transfer of {} ETH to {} on chain {}", amount, to, chain_id);
    Ok(
        ToolResponse::new(format!("EVM transfer of {amount} ETH to {to} created"))
            .evm(request)
            .with("chainId", chain_id),
    )
}

/// GET /api/tools/eth-sign-request
pub async fn eth_sign_request_handler(
    State(_state): State<AppState>,
    params: ToolParams,
) -> ToolResult {
    let address = require(&params, "evmAddress", "EVM address")?;
    let raw_method = require(&params, "method", "Signing method")?;
    let method: SignMethod = raw_method.parse().map_err(|e: anyhow::Error| {
        let supported: Vec<&str> = SignMethod::ALL.iter().map(|m| m.as_str()).collect();
        ToolError::BadRequest(
            ErrorBody::new(e.to_string())
                .details(format!("Supported methods: {}", supported.join(", "))),
        )
    })?;
    let chain_id = chain_id(&params, DEFAULT_SIGN_CHAIN_ID)?;
    let message = params
        .str("message")
        .unwrap_or_else(|| DEFAULT_SIGN_MESSAGE.to_string());

    let request =
        eth_sign_request(method, chain_id, &address, &message).map_err(invalid_address)?;
    Ok(ToolResponse::new(format!(
        "{} request for {} on chain {}",
        method.as_str(),
        address,
        chain_id
    ))
    .evm(request))
}
