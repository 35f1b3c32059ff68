use axum::extract::State;
use serde_json::json;
use tracing::info;

use crate::amount::{Rounding, SUI_DECIMALS};
use crate::api::{
    params::ToolParams,
    response::{ErrorBody, ToolError, ToolResponse, ToolResult},
};
use crate::blockchain::{models::Network, services::transfer::sui_transfer_request};
use crate::utils::{base_units, network, positive_amount, require, sui_address};
use crate::AppState;

/// GET /api/tools/create-sui-transaction
pub async fn create_sui_transaction_handler(
    State(_state): State<AppState>,
    params: ToolParams,
) -> ToolResult {
    let recipient = require(&params, "recipient", "Recipient address")?;
    let raw_amount = require(&params, "amount", "Amount")?;
    let transaction_type = params.str("type").unwrap_or_else(|| "transfer".to_string());

    let amount = positive_amount(&raw_amount, "Invalid amount. Must be a positive number")?;
    let amount_in_mist = base_units(
        &amount,
        SUI_DECIMALS,
        Rounding::Floor,
        "Invalid amount. Must be a positive number",
    )?;
    let network = network(&params, Network::Devnet)?;
    sui_address(&recipient, "recipient address")?;

    info!(
        "Creating Sui {} of {} SUI to {} on {}",
        transaction_type, amount, recipient, network
    );

    let request = sui_transfer_request(network, &recipient, amount_in_mist, &transaction_type);
    Ok(ToolResponse::new(format!(
        "Sui {transaction_type} transaction created for {amount} SUI to {recipient} on {network}. Use 'generate-sui-tx' tool to execute."
    ))
    .sui(request)
    .with("recipient", &recipient)
    .with("amount", amount.to_f64())
    .with("amountInMist", amount_in_mist.to_string())
    .with("network", network)
    .with("transactionType", &transaction_type)
    .with(
        "note",
        "Using simplified transaction format compatible with Bitte Protocol",
    ))
}

/// GET /api/tools/transfer-sui-nft
///
/// Validates the request, then explains that NFT transfers cannot be signed
/// through `generate-sui-tx`.
pub async fn transfer_sui_nft_handler(params: ToolParams) -> ToolResult {
    let object_id = require(&params, "objectId", "NFT object ID")?;
    let recipient = require(&params, "recipient", "Recipient address")?;
    let network = network(&params, Network::Devnet)?;

    if !(object_id.starts_with("0x") && object_id.len() >= 10) {
        return Err(ToolError::bad_request(
            "Invalid object ID format. Must be a valid Sui object ID starting with 0x",
        ));
    }
    sui_address(&recipient, "recipient address")?;

    Err(ToolError::Unsupported(
        ErrorBody::new("NFT transfer not supported by current Bitte Protocol integration")
            .with(
                "message",
                "The generate-sui-tx tool currently only supports simple SUI transfers with (recipientAddress, senderAddress, amountInSui) format.",
            )
            .with(
                "recommendation",
                "Use create-sui-transaction for SUI transfers. NFT operations may require direct wallet integration.",
            )
            .with(
                "supportedOperations",
                [
                    "SUI token transfers via create-sui-transaction",
                    "Balance checking via sui-balance",
                ],
            )
            .with(
                "nftGuidance",
                "For NFT operations, you may need to use a direct Sui wallet or wait for expanded Bitte Protocol support.",
            )
            .with(
                "requestedOperation",
                json!({
                    "type": "nft-transfer",
                    "objectId": object_id,
                    "recipient": recipient,
                    "network": network,
                }),
            ),
    ))
}
