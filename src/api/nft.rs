//! NFT marketplace tools: mint, list, buy, kiosks, wallet contents and pets.

use axum::extract::State;
use base64::{engine::general_purpose::STANDARD as BASE64STD, Engine};
use serde_json::json;
use tracing::info;

use crate::amount::{DecimalAmount, Rounding, SUI_DECIMALS};
use crate::api::{
    params::ToolParams,
    response::{ErrorBody, ToolError, ToolResponse, ToolResult},
};
use crate::blockchain::{
    models::{MoveCallDescriptor, Network, SuiSignRequest},
    services::nft::{
        buy_nft_tx, check_nft_wallet, create_kiosk_tx, list_nft_tx, mint_nft_tx, mint_pet_tx,
        pet_description, PetType, BUY_GAS_SUI, KIOSK_GAS_SUI, LIST_GAS_SUI, MINT_GAS_SUI,
        PET_GAS_SUI,
    },
    transaction::TransactionBuilder,
    SuiClient,
};
use crate::utils::{
    base_units, buildable_sui_address, network, positive_amount, require, require_config,
    sui_address,
};
use crate::AppState;

struct BuiltTransaction {
    base64: String,
    size: usize,
}

async fn build(
    state: &AppState,
    network: Network,
    tx: TransactionBuilder,
    context: &'static str,
) -> ToolResult<BuiltTransaction> {
    let client = SuiClient::for_network(&state.config, network);
    let bytes = tx
        .build(&client, state.config.max_gas_budget)
        .await
        .map_err(ToolError::upstream(context))?;
    Ok(BuiltTransaction {
        base64: BASE64STD.encode(&bytes),
        size: bytes.len(),
    })
}

fn mist(amount: &DecimalAmount, rounding: Rounding, message: &str) -> ToolResult<u64> {
    let units = base_units(amount, SUI_DECIMALS, rounding, message)?;
    u64::try_from(units)
        .map_err(|e| ToolError::BadRequest(ErrorBody::new(message).details(e.to_string())))
}

fn built_request(
    built: &BuiltTransaction,
    network: Network,
    owner: &str,
    amount_in_sui: f64,
) -> SuiSignRequest {
    SuiSignRequest::Transaction {
        transaction_bytes: built.base64.clone(),
        network,
        owner_address: owner.to_string(),
        amount_in_sui,
    }
}

/// GET|POST /api/tools/mint-nft
pub async fn mint_nft_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let user_address = require(&params, "userAddress", "User address")?;
    let name = require(&params, "name", "Name")?;
    let description = require(&params, "description", "Description")?;
    let image_url = require(&params, "imageUrl", "Image URL")?;
    let network = network(&params, Network::Testnet)?;
    buildable_sui_address(&user_address, "user address")?;
    let package_id = require_config(&state.config.nft_package_id, "NFT_PACKAGE_ID")?;

    info!("Minting NFT '{}' for {} on {}", name, user_address, network);
    let tx = mint_nft_tx(package_id, &user_address, &name, &description, &image_url)
        .map_err(ToolError::upstream("Failed to create mint NFT transaction"))?;
    let built = build(&state, network, tx, "Failed to create mint NFT transaction").await?;

    Ok(ToolResponse::new(format!(
        "NFT \"{name}\" will be minted and transferred to your wallet on {network}"
    ))
    .sui(built_request(&built, network, &user_address, MINT_GAS_SUI))
    .data(json!({
        "suiTransactionBytes": built.base64,
        "ownerAddress": user_address,
        "network": network,
        "packageId": package_id,
        "nftDetails": {
            "name": name,
            "description": description,
            "imageUrl": image_url,
        },
    })))
}

/// GET|POST /api/tools/list-nft
pub async fn list_nft_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let user_address = require(&params, "userAddress", "User address")?;
    let nft_id = require(&params, "nftId", "NFT ID")?;
    let raw_price = require(&params, "price", "Price")?;
    let price = positive_amount(&raw_price, "Price must be a positive number in SUI")?;
    let price_mist = mist(&price, Rounding::Floor, "Price must be a positive number in SUI")?;
    let network = network(&params, Network::Testnet)?;
    buildable_sui_address(&user_address, "user address")?;
    buildable_sui_address(&nft_id, "NFT ID")?;
    let package_id = require_config(&state.config.nft_package_id, "NFT_PACKAGE_ID")?;
    let marketplace_id = require_config(&state.config.nft_marketplace_id, "NFT_MARKETPLACE_ID")?;

    info!("Listing NFT {} for {} SUI on {}", nft_id, price, network);
    let tx = list_nft_tx(package_id, marketplace_id, &user_address, &nft_id, price_mist)
        .map_err(ToolError::upstream("Failed to create list NFT transaction"))?;
    let built = build(&state, network, tx, "Failed to create list NFT transaction").await?;

    Ok(ToolResponse::new(format!(
        "NFT {nft_id} will be listed for {price} SUI on {network} marketplace"
    ))
    .sui(built_request(&built, network, &user_address, LIST_GAS_SUI))
    .data(json!({
        "suiTransactionBytes": built.base64,
        "ownerAddress": user_address,
        "network": network,
        "packageId": package_id,
        "marketplaceId": marketplace_id,
        "nftId": nft_id,
        "priceInSui": price.to_f64(),
        "priceInMist": price_mist.to_string(),
    })))
}

/// GET|POST /api/tools/buy-nft
pub async fn buy_nft_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let user_address = require(&params, "userAddress", "User address")?;
    let nft_id = require(&params, "nftId", "NFT ID")?;
    let raw_payment = require(&params, "paymentAmount", "Payment amount")?;
    let payment = positive_amount(&raw_payment, "Payment amount must be a positive number in SUI")?;
    // Rounded up so the payment always covers the listed price.
    let payment_mist = mist(
        &payment,
        Rounding::Ceil,
        "Payment amount must be a positive number in SUI",
    )?;
    let network = network(&params, Network::Testnet)?;
    buildable_sui_address(&user_address, "user address")?;
    buildable_sui_address(&nft_id, "NFT ID")?;
    let package_id = require_config(&state.config.nft_package_id, "NFT_PACKAGE_ID")?;
    let marketplace_id = require_config(&state.config.nft_marketplace_id, "NFT_MARKETPLACE_ID")?;

    info!("Buying NFT {} for {} SUI on {}", nft_id, payment, network);
    let tx = buy_nft_tx(package_id, marketplace_id, &user_address, &nft_id, payment_mist)
        .map_err(ToolError::upstream("Failed to create buy NFT transaction"))?;
    let built = build(&state, network, tx, "Failed to create buy NFT transaction").await?;

    let total = payment.to_f64() + BUY_GAS_SUI;
    Ok(ToolResponse::new(format!(
        "NFT {nft_id} will be purchased for {payment} SUI on {network}"
    ))
    .sui(built_request(&built, network, &user_address, total))
    .data(json!({
        "suiTransactionBytes": built.base64,
        "ownerAddress": user_address,
        "network": network,
        "packageId": package_id,
        "marketplaceId": marketplace_id,
        "nftId": nft_id,
        "paymentAmountInSui": payment.to_f64(),
        "paymentAmountInMist": payment_mist.to_string(),
        "totalAmountRequired": total,
    })))
}

/// GET|POST /api/tools/create-kiosk
pub async fn create_kiosk_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let user_address = require(&params, "userAddress", "User address")?;
    let network = network(&params, Network::Testnet)?;
    buildable_sui_address(&user_address, "user address")?;
    let package_id = require_config(&state.config.nft_package_id, "NFT_PACKAGE_ID")?;

    info!("Creating kiosk for {} on {}", user_address, network);
    let tx = create_kiosk_tx(package_id, &user_address)
        .map_err(ToolError::upstream("Failed to create kiosk transaction"))?;
    let built = build(&state, network, tx, "Failed to create kiosk transaction").await?;

    Ok(ToolResponse::new(format!(
        "Kiosk creation transaction created successfully on {network}"
    ))
    .sui(built_request(&built, network, &user_address, KIOSK_GAS_SUI))
    .data(json!({
        "suiTransactionBytes": built.base64,
        "ownerAddress": user_address,
        "network": network,
        "packageId": package_id,
        "transactionSize": built.size,
    })))
}

/// GET|POST /api/tools/check-nft-wallet
pub async fn check_nft_wallet_handler(
    State(state): State<AppState>,
    params: ToolParams,
) -> ToolResult {
    let user_address = require(&params, "userAddress", "User address")?;
    let network = network(&params, Network::Testnet)?;
    sui_address(&user_address, "user address")?;
    let package_id = require_config(&state.config.nft_package_id, "NFT_PACKAGE_ID")?;

    let client = SuiClient::for_network(&state.config, network);
    let wallet = check_nft_wallet(&client, package_id, &user_address)
        .await
        .map_err(ToolError::upstream("Failed to check NFT wallet"))?;

    Ok(ToolResponse::new(format!(
        "Found {} NFT(s) in wallet on {}",
        wallet.nft_count, network
    ))
    .data(json!({
        "walletAddress": user_address,
        "network": network,
        "nfts": wallet.nfts,
        "nftCount": wallet.nft_count,
        "suiBalance": wallet.sui_balance,
        "packageId": package_id,
    })))
}

/// GET /api/tools/test-sui-call
///
/// A descriptor for a read-only marketplace function, used to check that the
/// configured package and the wallet's move call format line up.
pub async fn test_sui_call_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let network = network(&params, Network::Testnet)?;
    let package_id = require_config(&state.config.nft_package_id, "NFT_PACKAGE_ID")?;

    let request = SuiSignRequest::MoveCall {
        network,
        move_call: MoveCallDescriptor {
            package: package_id.to_string(),
            module: "marketplace".to_string(),
            function: "get_collection_info".to_string(),
            arguments: Vec::new(),
            type_arguments: Vec::new(),
        },
        recipient_address: None,
        description: "Test function call to verify package and format".to_string(),
    };

    Ok(ToolResponse::new(format!(
        "Test transaction created on {network}. Use 'generate-sui-tx' tool to execute."
    ))
    .sui(request)
    .instruction("Test call to verify our package and format work correctly")
    .with(
        "debug",
        json!({
            "packageId": package_id,
            "network": network,
            "module": "marketplace",
        }),
    ))
}

/// POST /api/tools/mint-pet
pub async fn mint_pet_handler(State(state): State<AppState>, params: ToolParams) -> ToolResult {
    let user_address = params
        .str_any(&["userAddress", "address"])
        .ok_or(ToolError::MissingParameter("User address"))?;
    let pet_name = params
        .str_any(&["petName", "name"])
        .ok_or(ToolError::MissingParameter("Pet name"))?;
    let raw_type = require(&params, "petType", "Pet type")?;
    let pet_type: PetType = raw_type.parse().map_err(|_| {
        ToolError::BadRequest(
            ErrorBody::new("Invalid pet type. Supported types: dog, cat, dragon")
                .details(format!("Received '{raw_type}'")),
        )
    })?;
    let network = network(&params, Network::Testnet)?;
    buildable_sui_address(&user_address, "user address")?;
    let package_id = require_config(&state.config.pet_package_id, "PET_PACKAGE_ID")?;

    info!(
        "Minting {} pet '{}' for {} on {}",
        pet_type.as_str(),
        pet_name,
        user_address,
        network
    );
    let tx = mint_pet_tx(package_id, &user_address, &pet_name, pet_type)
        .map_err(ToolError::upstream("Failed to create mint pet transaction"))?;
    let built = build(&state, network, tx, "Failed to create mint pet transaction").await?;

    Ok(ToolResponse::new(format!(
        "PET NFT mint transaction created successfully for {pet_name} ({})",
        pet_type.as_str()
    ))
    .sui(built_request(&built, network, &user_address, PET_GAS_SUI))
    .data(json!({
        "suiTransactionBytes": built.base64,
        "petName": &pet_name,
        "petType": pet_type,
        "petTypeNumber": pet_type.code(),
        "description": pet_description(pet_type, &pet_name),
        "imageUrl": pet_type.image_url(),
        "ownerAddress": user_address,
        "network": network,
        "packageId": package_id,
        "transactionSize": built.size,
    })))
}

/// GET /api/tools/create-nft
///
/// Answers with a single move call descriptor against the framework NFT
/// module; the wallet resolves and builds it.
pub async fn create_nft_handler(params: ToolParams) -> ToolResult {
    let name = require(&params, "name", "NFT name")?;
    let description = require(&params, "description", "NFT description")?;
    let image_url = require(&params, "imageUrl", "Image URL")?;
    let recipient = require(&params, "recipient", "Recipient address")?;
    let network = network(&params, Network::Devnet)?;
    sui_address(&recipient, "recipient address")?;

    let module = if network == Network::Devnet { "devnet_nft" } else { "nft" };
    let arguments = vec![json!(name), json!(description), json!(image_url)];
    let request = SuiSignRequest::MoveCall {
        network,
        move_call: MoveCallDescriptor {
            package: "0x2".to_string(),
            module: module.to_string(),
            function: "mint".to_string(),
            arguments: arguments.clone(),
            type_arguments: Vec::new(),
        },
        recipient_address: Some(recipient.clone()),
        description: format!("Mint NFT \"{name}\" for {recipient}"),
    };

    Ok(ToolResponse::new(format!(
        "NFT minting transaction created for \"{name}\" on {network}"
    ))
    .sui(request)
    .with(
        "nftDetails",
        json!({
            "name": name,
            "description": description,
            "imageUrl": image_url,
            "recipient": recipient,
        }),
    )
    .with("network", network)
    .with(
        "debugInfo",
        json!({
            "packageId": "0x2",
            "module": module,
            "function": "mint",
            "arguments": arguments,
            "recipient": recipient,
        }),
    ))
}
