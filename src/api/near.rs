use axum::extract::State;
use tracing::info;

use crate::amount::{Rounding, NEAR_DECIMALS};
use crate::api::{
    params::ToolParams,
    response::{ToolResponse, ToolResult},
};
use crate::blockchain::services::transfer::near_transfer_payload;
use crate::utils::{base_units, positive_amount, require};
use crate::AppState;

/// GET /api/tools/create-near-transaction
pub async fn create_near_transaction_handler(
    State(_state): State<AppState>,
    params: ToolParams,
) -> ToolResult {
    let receiver_id = require(&params, "receiverId", "Receiver ID")?;
    let raw_amount = require(&params, "amount", "Amount")?;

    let amount = positive_amount(&raw_amount, "Invalid amount. Must be a positive number")?;
    let deposit = base_units(
        &amount,
        NEAR_DECIMALS,
        Rounding::Floor,
        "Invalid amount. Must be a positive number",
    )?;

    info!("Creating NEAR transfer of {} NEAR to {}", amount, receiver_id);
    Ok(
        ToolResponse::new(format!("NEAR transfer of {amount} NEAR to {receiver_id} created"))
            .near(near_transfer_payload(&receiver_id, deposit)),
    )
}
