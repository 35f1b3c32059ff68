//! Swap tools: a DeepBook-style route (`sui-swap`) and Cetus (`swap-token`).

use axum::extract::State;
use base64::{engine::general_purpose::STANDARD as BASE64STD, Engine};
use serde_json::json;
use tracing::{info, warn};

use crate::amount::DecimalAmount;
use crate::api::{
    params::ToolParams,
    response::{ErrorBody, ToolError, ToolResponse, ToolResult},
};
use crate::blockchain::{
    models::{Network, SuiSignRequest},
    services::swap::{
        build_with_fallback, cetus_swap_target, cetus_swap_tx, check_balance, deepbook_swap_tx,
        estimate_output, find_cetus_pool, normalize_token, parse_slippage, parse_swap_amount,
        split_and_return_tx, to_token_units, token_symbol, validate_pair, SwapRejection,
        CETUS_GLOBAL_CONFIG, CETUS_INTEGRATE_PACKAGE, DEEPBOOK_PACKAGE, DEFAULT_SLIPPAGE,
        SWAP_GAS_ESTIMATE_SUI,
    },
    sui_types::SUI_COIN_TYPE,
    SuiClient,
};
use crate::utils::{buildable_sui_address, network, require};
use crate::AppState;

impl From<SwapRejection> for ToolError {
    fn from(rejection: SwapRejection) -> Self {
        let mut body = ErrorBody::new(rejection.error)
            .details(rejection.details)
            .code(rejection.code);
        if let Some(current) = rejection.current_balance {
            body = body.with("currentBalance", current);
        }
        if !rejection.suggestions.is_empty() {
            body = body.with("suggestions", rejection.suggestions);
        }
        ToolError::BadRequest(body)
    }
}

/// Balance rejections also echo the amount that was asked for.
fn with_required_amount(rejection: SwapRejection, required: &str) -> ToolError {
    match ToolError::from(rejection) {
        ToolError::BadRequest(body) => ToolError::BadRequest(body.with("requiredAmount", required)),
        other => other,
    }
}

struct SwapRequest {
    user_address: String,
    token_from: String,
    token_to: String,
    amount_in: String,
    network: Network,
}

fn swap_request(params: &ToolParams) -> ToolResult<SwapRequest> {
    Ok(SwapRequest {
        user_address: require(params, "userAddress", "User address")?,
        token_from: require(params, "tokenFrom", "Token from")?,
        token_to: require(params, "tokenTo", "Token to")?,
        amount_in: require(params, "amountIn", "Amount in")?,
        network: network(params, Network::Testnet)?,
    })
}

fn units(amount: &DecimalAmount, coin_type: &str) -> ToolResult<u64> {
    to_token_units(amount, coin_type).map_err(|e| {
        ToolError::BadRequest(
            ErrorBody::new("Invalid amount")
                .details(e.to_string())
                .code("INVALID_AMOUNT"),
        )
    })
}

/// GET|POST /api/tools/sui-swap
pub async fn sui_swap_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let request = swap_request(&params)?;
    let from = normalize_token(&request.token_from);
    let to = normalize_token(&request.token_to);
    validate_pair(&from, &to, request.network)?;
    let amount = parse_swap_amount(&request.amount_in)?;
    let slippage_raw = params
        .str("slippageTolerance")
        .unwrap_or_else(|| DEFAULT_SLIPPAGE.to_string());
    let slippage = parse_slippage(&slippage_raw)?;
    buildable_sui_address(&request.user_address, "user address")?;

    let client = SuiClient::for_network(&state.config, request.network);
    let coins = check_balance(&client, &request.user_address, &from, &amount, request.network)
        .await
        .map_err(|rejection| with_required_amount(rejection, &request.amount_in))?;

    let amount_units = units(&amount, &from)?;
    let input_coin = coins.first().map(|c| c.coin_object_id.as_str());
    info!(
        "Swapping {} {} -> {} for {} on {}",
        amount,
        token_symbol(&from),
        token_symbol(&to),
        request.user_address,
        request.network
    );

    let context = "Failed to create swap transaction";
    let primary = deepbook_swap_tx(&request.user_address, &from, &to, amount_units, input_coin)
        .map_err(ToolError::upstream(context))?;
    let fallback = split_and_return_tx(&request.user_address, input_coin, amount_units)
        .map_err(ToolError::upstream(context))?;
    let built = build_with_fallback(&client, state.config.max_gas_budget, &primary, &fallback)
        .await
        .map_err(ToolError::upstream(context))?;
    if built.fallback_used {
        warn!("sui-swap for {} built the split-and-return fallback", request.user_address);
    }

    let from_symbol = token_symbol(&from);
    let to_symbol = token_symbol(&to);
    let request_to_sign = SuiSignRequest::Transaction {
        transaction_bytes: built.transaction_bytes.clone(),
        network: request.network,
        owner_address: request.user_address.clone(),
        amount_in_sui: SWAP_GAS_ESTIMATE_SUI,
    };

    // Split-and-return exchanges nothing, so there is no output to estimate.
    if built.fallback_used {
        return Ok(ToolResponse::new(format!(
            "No swap executed: the {from_symbol} → {to_symbol} route could not be built on {}. The transaction only splits {} {} and returns it to {}.",
            request.network, request.amount_in, from_symbol, request.user_address
        ))
        .sui(request_to_sign)
        .data(json!({
            "suiTransactionBytes": &built.transaction_bytes,
            "ownerAddress": &request.user_address,
            "network": request.network,
            "fallbackUsed": true,
            "swapExecuted": false,
            "swap": {
                "tokenFrom": &from,
                "tokenTo": &to,
                "tokenFromSymbol": &from_symbol,
                "tokenToSymbol": &to_symbol,
                "amountIn": &request.amount_in,
                "amountInUnits": amount_units.to_string(),
            },
            "gasFee": format!("{SWAP_GAS_ESTIMATE_SUI} SUI"),
        }))
        .with(
            "note",
            "Signing this transaction does not exchange tokens. Use swap-token for Cetus pools (SUI/USDC, SUI/USDT, SUI/CETUS).",
        ));
    }

    let (estimated, minimum) = estimate_output(amount.to_f64(), slippage);
    Ok(ToolResponse::new(format!(
        "Swap {} {} → {} on {} with {}% slippage tolerance",
        request.amount_in, from_symbol, to_symbol, request.network, slippage_raw
    ))
    .sui(request_to_sign)
    .data(json!({
        "suiTransactionBytes": &built.transaction_bytes,
        "ownerAddress": &request.user_address,
        "network": request.network,
        "packageId": DEEPBOOK_PACKAGE,
        "fallbackUsed": false,
        "swapExecuted": true,
        "swap": {
            "tokenFrom": &from,
            "tokenTo": &to,
            "tokenFromSymbol": &from_symbol,
            "tokenToSymbol": &to_symbol,
            "amountIn": &request.amount_in,
            "amountInUnits": amount_units.to_string(),
            "estimatedOutput": format!("{estimated:.6}"),
            "minOutput": format!("{minimum:.6}"),
            "slippageTolerance": format!("{slippage_raw}%"),
            "exchangeRate": "~0.998",
        },
        "gasFee": format!("{SWAP_GAS_ESTIMATE_SUI} SUI"),
    })))
}

/// GET|POST /api/tools/swap-token
pub async fn swap_token_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let request = swap_request(&params)?;
    let from = normalize_token(&request.token_from);
    let to = normalize_token(&request.token_to);
    let pool = find_cetus_pool(&from, &to).ok_or_else(|| {
        ToolError::BadRequest(
            ErrorBody::new(format!(
                "Cetus pool not found for {} to {}",
                request.token_from, request.token_to
            ))
            .details("Supported pairs: SUI/USDC, SUI/USDT, SUI/CETUS")
            .code("POOL_NOT_FOUND"),
        )
    })?;
    let amount = parse_swap_amount(&request.amount_in)?;
    let slippage_raw = params
        .str("slippageTolerance")
        .unwrap_or_else(|| DEFAULT_SLIPPAGE.to_string());
    let slippage = parse_slippage(&slippage_raw)?;

    let min_out_raw = match params.str("minAmountOut") {
        Some(raw) => raw,
        None => (amount.to_f64() * (1.0 - slippage / 100.0)).to_string(),
    };
    let min_out: DecimalAmount = min_out_raw.parse().map_err(|_| {
        ToolError::BadRequest(
            ErrorBody::new("Invalid minimum output")
                .details("minAmountOut must be a non-negative decimal number")
                .code("INVALID_AMOUNT"),
        )
    })?;
    buildable_sui_address(&request.user_address, "user address")?;

    let amount_units = units(&amount, &from)?;
    let min_out_units = units(&min_out, &to)?;

    let context = "Failed to create swap transaction";
    let client = SuiClient::for_network(&state.config, request.network);
    let coins = client
        .get_coins(&request.user_address, &from)
        .await
        .map_err(ToolError::upstream(context))?;
    let input_coin = match coins.data.first() {
        Some(coin) => coin.coin_object_id.clone(),
        None => {
            return Err(ToolError::BadRequest(
                ErrorBody::new(format!(
                    "No {} coins found in user address",
                    request.token_from
                ))
                .code("TOKEN_NOT_FOUND"),
            ))
        }
    };

    info!(
        "Cetus swap {} {} -> {} via pool {} on {}",
        request.amount_in,
        token_symbol(&from),
        token_symbol(&to),
        pool.key,
        request.network
    );
    let primary = cetus_swap_tx(
        &request.user_address,
        &pool,
        &input_coin,
        amount_units,
        min_out_units,
    )
    .map_err(ToolError::upstream(context))?;
    let fallback = split_and_return_tx(&request.user_address, Some(&input_coin), amount_units)
        .map_err(ToolError::upstream(context))?;
    let built = build_with_fallback(&client, state.config.max_gas_budget, &primary, &fallback)
        .await
        .map_err(ToolError::upstream(context))?;
    if built.fallback_used {
        warn!("swap-token for {} built the split-and-return fallback", request.user_address);
    }

    let from_symbol = token_symbol(&from);
    let to_symbol = token_symbol(&to);
    let fee_percent = pool.fee as f64 / 10_000.0;
    let amount_in_sui = if from == SUI_COIN_TYPE {
        amount.to_f64() + SWAP_GAS_ESTIMATE_SUI
    } else {
        SWAP_GAS_ESTIMATE_SUI
    };
    let transaction_size = BASE64STD
        .decode(&built.transaction_bytes)
        .map(|bytes| bytes.len())
        .unwrap_or_default();

    let message = if built.fallback_used {
        format!(
            "No swap executed: the Cetus {} pool call could not be built. The transaction only splits {} {} and returns it to {}.",
            pool.key, request.amount_in, from_symbol, request.user_address
        )
    } else {
        format!(
            "Cetus swap transaction created: {} {} → {} {} (Fee: {}%)",
            request.amount_in, from_symbol, min_out_raw, to_symbol, fee_percent
        )
    };
    Ok(ToolResponse::new(message)
    .sui(SuiSignRequest::Transaction {
        transaction_bytes: built.transaction_bytes.clone(),
        network: request.network,
        owner_address: request.user_address.clone(),
        amount_in_sui,
    })
    .data(json!({
        "suiTransactionBytes": &built.transaction_bytes,
        "ownerAddress": &request.user_address,
        "network": request.network,
        "packageId": CETUS_INTEGRATE_PACKAGE,
        "transactionSize": transaction_size,
        "fallbackUsed": built.fallback_used,
        "swapExecuted": !built.fallback_used,
    }))
    .with(
        "transactionInstructions",
        json!({
            "method": "moveCall",
            "target": cetus_swap_target(),
            "typeArguments": [&pool.token_a, &pool.token_b],
            "arguments": [
                CETUS_GLOBAL_CONFIG,
                &input_coin,
                amount_units.to_string(),
                min_out_units.to_string(),
                pool.fee.to_string(),
                pool.is_reversed.to_string(),
                &request.user_address,
            ],
        }),
    )
    .with(
        "pool",
        json!({
            "key": &pool.key,
            "poolId": params.str("poolId"),
            "tokenA": token_symbol(&pool.token_a),
            "tokenB": token_symbol(&pool.token_b),
            "fee": pool.fee,
            "tickSpacing": pool.tick_spacing,
            "isReversed": pool.is_reversed,
        }),
    )
    .with(
        "swap",
        json!({
            "tokenFrom": &from,
            "tokenTo": &to,
            "amountIn": &request.amount_in,
            "minAmountOut": &min_out_raw,
            "slippageTolerance": &slippage_raw,
            "amountInUnits": amount_units.to_string(),
            "minAmountOutUnits": min_out_units.to_string(),
            "inputCoinId": &input_coin,
            "swapFunction": cetus_swap_target(),
        }),
    )
    .with(
        "instructions",
        json!({
            "en": format!(
                "Swapping {} {} for minimum {} {} on Cetus Protocol",
                request.amount_in, from_symbol, min_out_raw, to_symbol
            ),
        }),
    ))
}
