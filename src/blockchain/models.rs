// src/blockchain/models.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// --- Networks ---

/// The Sui networks a tool can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unsupported network '{0}'")]
pub struct UnknownNetwork(pub String);

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Devnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }

    /// Public fullnode for the network.
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
        }
    }

    /// Comma separated list used in validation messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(Network::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

// --- Sign requests handed to the wallet ---

/// A Move call described by target and arguments, resolved by the wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveCallDescriptor {
    pub package: String,
    pub module: String,
    pub function: String,
    pub arguments: Vec<Value>,
    pub type_arguments: Vec<String>,
}

/// The payload given to the wallet's `generate-sui-tx` tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SuiSignRequest {
    /// Fully built programmable transaction.
    #[serde(rename_all = "camelCase")]
    Transaction {
        transaction_bytes: String,
        network: Network,
        owner_address: String,
        amount_in_sui: f64,
    },
    /// Plain SUI transfer that the wallet builds itself.
    #[serde(rename_all = "camelCase")]
    Transfer {
        network: Network,
        recipient_address: String,
        sender_address: String,
        amount_in_sui: f64,
        #[serde(rename = "type")]
        transfer_type: String,
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    MoveCall {
        network: Network,
        move_call: MoveCallDescriptor,
        #[serde(skip_serializing_if = "Option::is_none")]
        recipient_address: Option<String>,
        description: String,
    },
}

/// Unsigned EVM transaction or signature request for `generate-evm-tx`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EvmSignRequest {
    #[serde(rename_all = "camelCase")]
    Transaction {
        to: String,
        value: String,
        data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Signature {
        method: String,
        chain_id: u64,
        params: Vec<Value>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NearTransactionPayload {
    pub receiver_id: String,
    pub actions: Vec<NearAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub params: Value,
}

// --- Sui JSON-RPC result shapes ---

/// Sui encodes 64 and 128 bit integers as decimal strings.
pub(crate) mod bigint {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64> + std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(D::Error::custom),
            Raw::Number(n) => {
                T::try_from(n).map_err(|_| D::Error::custom(format!("{n} out of range")))
            }
        }
    }

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: std::fmt::Display,
    {
        serializer.serialize_str(&value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub coin_type: String,
    #[serde(default)]
    pub coin_object_count: u64,
    #[serde(with = "bigint")]
    pub total_balance: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: String,
    #[serde(with = "bigint")]
    pub version: u64,
    pub digest: String,
    #[serde(with = "bigint")]
    pub balance: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<Value>,
    #[serde(default)]
    pub has_next_page: bool,
}

pub type CoinPage = Page<Coin>;

/// One entry of `suix_getOwnedObjects` / `sui_multiGetObjects`.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiObjectResponse {
    pub data: Option<SuiObjectData>,
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    pub object_id: String,
    #[serde(with = "bigint")]
    pub version: u64,
    pub digest: String,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub owner: Option<Value>,
    pub display: Option<DisplayFields>,
    pub content: Option<ParsedContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayFields {
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContent {
    pub data_type: String,
    #[serde(default)]
    pub has_public_transfer: bool,
    pub fields: Option<Map<String, Value>>,
}

/// An owned object as the tools report it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnedObject {
    pub object_id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    pub has_public_transfer: bool,
    pub display: Option<Value>,
}

impl From<SuiObjectData> for OwnedObject {
    fn from(data: SuiObjectData) -> Self {
        let (fields, has_public_transfer) = match data.content {
            Some(content) if content.data_type == "moveObject" => {
                (content.fields, content.has_public_transfer)
            }
            _ => (None, false),
        };
        Self {
            object_id: data.object_id,
            object_type: data.object_type.unwrap_or_default(),
            version: data.version,
            fields,
            has_public_transfer,
            display: data.display.and_then(|d| d.data).filter(|d| !d.is_null()),
        }
    }
}

impl OwnedObject {
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.as_ref()?.get(key)?.as_str()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResponse {
    pub effects: DryRunEffects,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunEffects {
    pub status: ExecutionStatus,
    pub gas_used: GasCostSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(with = "bigint")]
    pub computation_cost: u64,
    #[serde(with = "bigint")]
    pub storage_cost: u64,
    #[serde(with = "bigint")]
    pub storage_rebate: u64,
}
