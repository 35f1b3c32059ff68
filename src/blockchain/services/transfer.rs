// src/blockchain/services/transfer.rs

use std::str::FromStr;

use anyhow::{anyhow, Result};
use ethers_core::{
    types::{Address, U256},
    utils::to_checksum,
};
use serde_json::{json, Value};

use crate::amount::{format_base_units, SUI_DECIMALS};
use crate::blockchain::models::{
    EvmSignRequest, NearAction, NearTransactionPayload, Network, SuiSignRequest,
};

pub const DEFAULT_SIGN_CHAIN_ID: u64 = 8453;
pub const DEFAULT_SIGN_MESSAGE: &str = "Hello Bitte";

/// SUI transfer left for the wallet to build. The sender is a placeholder
/// that the wallet replaces with the connected account.
pub fn sui_transfer_request(
    network: Network,
    recipient: &str,
    amount_mist: u128,
    transfer_type: &str,
) -> SuiSignRequest {
    let amount = format_base_units(amount_mist, SUI_DECIMALS);
    let verb = if transfer_type == "transfer" { "Send" } else { "Transfer" };
    SuiSignRequest::Transfer {
        network,
        recipient_address: recipient.to_string(),
        sender_address: recipient.to_string(),
        amount_in_sui: amount.parse().unwrap_or_default(),
        transfer_type: transfer_type.to_string(),
        description: format!("{verb} {amount} SUI to {recipient}"),
    }
}

pub fn near_transfer_payload(receiver_id: &str, deposit_yocto: u128) -> NearTransactionPayload {
    NearTransactionPayload {
        receiver_id: receiver_id.to_string(),
        actions: vec![NearAction {
            action_type: "Transfer".to_string(),
            params: json!({ "deposit": deposit_yocto.to_string() }),
        }],
    }
}

/// Parses and checksums a 20-byte EVM address.
pub fn evm_address(value: &str) -> Result<String> {
    let address = Address::from_str(value)
        .map_err(|e| anyhow!("'{value}' is not a valid EVM address: {e}"))?;
    Ok(to_checksum(&address, None))
}

/// Native value transfer: `value` is hex wei, `data` is empty.
pub fn evm_transfer_request(to: &str, value_wei: u128, from: Option<&str>) -> Result<EvmSignRequest> {
    Ok(EvmSignRequest::Transaction {
        to: evm_address(to)?,
        value: format!("{:#x}", U256::from(value_wei)),
        data: "0x".to_string(),
        from: from.map(evm_address).transpose()?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMethod {
    EthSign,
    PersonalSign,
    SignTypedData,
    SignTypedDataV4,
}

impl SignMethod {
    pub const ALL: [SignMethod; 4] = [
        SignMethod::EthSign,
        SignMethod::PersonalSign,
        SignMethod::SignTypedData,
        SignMethod::SignTypedDataV4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignMethod::EthSign => "eth_sign",
            SignMethod::PersonalSign => "personal_sign",
            SignMethod::SignTypedData => "eth_signTypedData",
            SignMethod::SignTypedDataV4 => "eth_signTypedData_v4",
        }
    }
}

impl FromStr for SignMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        SignMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| anyhow!("unsupported signing method '{s}'"))
    }
}

fn typed_data(chain_id: u64, message: &str) -> Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" }
            ],
            "Message": [
                { "name": "content", "type": "string" }
            ]
        },
        "primaryType": "Message",
        "domain": { "name": "Bitte Agent", "version": "1", "chainId": chain_id },
        "message": { "content": message }
    })
}

/// Signature request in the parameter order each RPC method expects.
pub fn eth_sign_request(
    method: SignMethod,
    chain_id: u64,
    address: &str,
    message: &str,
) -> Result<EvmSignRequest> {
    let address = evm_address(address)?;
    let hex_message = format!("0x{}", hex::encode(message.as_bytes()));
    let params = match method {
        SignMethod::EthSign => vec![json!(address), json!(hex_message)],
        SignMethod::PersonalSign => vec![json!(hex_message), json!(address)],
        SignMethod::SignTypedData | SignMethod::SignTypedDataV4 => {
            vec![json!(address), json!(typed_data(chain_id, message).to_string())]
        }
    };
    Ok(EvmSignRequest::Signature {
        method: method.as_str().to_string(),
        chain_id,
        params,
    })
}
