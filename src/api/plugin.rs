//! The agent manifest served at `/.well-known/ai-plugin.json`: an OpenAPI
//! 3.0 document with Bitte's `x-mb` extension, generated from [`TOOLS`].

use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::blockchain::models::Network;
use crate::config::Config;
use crate::AppState;

const ASSISTANT_NAME: &str = "Miko Assistant";
const ASSISTANT_DESCRIPTION: &str = "An assistant that builds transaction payloads for Sui, NEAR and EVM chains. It checks Sui balances and portfolios, mints, lists and buys Sui NFTs, swaps tokens on Sui, reads market prices, answers with blockchain information and the user's account id, drafts tweets and flips coins.";
const ASSISTANT_INSTRUCTIONS: &str = "First create a payload with the matching endpoint, then execute it on the client with the tool the response names: 'generate-sui-tx' for Sui (suiSignRequest), 'generate-evm-tx' for EVM (evmSignRequest) and 'generate-transaction' for NEAR (transactionPayload). Use /api/tools/sui-balance and /api/tools/sui-portfolio for read-only Sui queries and /api/tools/crypto-prices for market data. Sui endpoints accept a network of mainnet, testnet or devnet. Transferring an existing NFT object (transfer-sui-nft) is not supported and returns guidance instead of a transaction.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    /// Sui network with the tool's default.
    Network(Network),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub method: ToolMethod,
    pub summary: &'static str,
    pub params: &'static [ParamSpec],
}

const fn required(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::String, required: true, description }
}

const fn optional(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::String, required: false, description }
}

const fn number(name: &'static str, required: bool, description: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ParamKind::Number, required, description }
}

const fn network(default: Network) -> ParamSpec {
    ParamSpec {
        name: "network",
        kind: ParamKind::Network(default),
        required: false,
        description: "Sui network",
    }
}

const USER_ADDRESS: ParamSpec = required("userAddress", "Sui address of the user");

/// Every tool served under `/api/tools`.
pub static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "get-blockchains",
        method: ToolMethod::Get,
        summary: "List the blockchains this agent builds transactions for",
        params: &[],
    },
    ToolSpec {
        name: "get-user",
        method: ToolMethod::Get,
        summary: "Echo the user's account id and EVM address",
        params: &[
            optional("accountId", "The user's NEAR account id"),
            optional("evmAddress", "The user's EVM address"),
        ],
    },
    ToolSpec {
        name: "twitter",
        method: ToolMethod::Get,
        summary: "Generate a Twitter share intent URL",
        params: &[
            required("text", "The text of the tweet"),
            optional("url", "A URL to include in the tweet"),
            optional("hashtags", "Comma-separated hashtags without #"),
            optional("via", "Twitter username to attribute the tweet to"),
        ],
    },
    ToolSpec {
        name: "coinflip",
        method: ToolMethod::Get,
        summary: "Flip a coin and return heads or tails",
        params: &[],
    },
    ToolSpec {
        name: "create-near-transaction",
        method: ToolMethod::Get,
        summary: "Create a NEAR transfer payload for generate-transaction",
        params: &[
            required("receiverId", "The NEAR account id of the receiver"),
            number("amount", true, "Amount of NEAR to send"),
        ],
    },
    ToolSpec {
        name: "create-evm-transaction",
        method: ToolMethod::Get,
        summary: "Create an EVM transfer payload for generate-evm-tx",
        params: &[
            required("to", "The EVM address of the recipient"),
            number("amount", true, "Amount of ETH to transfer"),
            optional("from", "The EVM address of the sender"),
            number("chainId", false, "EVM chain id, 1 when omitted"),
        ],
    },
    ToolSpec {
        name: "eth-sign-request",
        method: ToolMethod::Get,
        summary: "Create an EVM message signing request for generate-evm-tx",
        params: &[
            required("evmAddress", "The EVM address that signs"),
            required(
                "method",
                "eth_sign, personal_sign, eth_signTypedData or eth_signTypedData_v4",
            ),
            number("chainId", false, "EVM chain id, 8453 when omitted"),
            optional("message", "Message to sign"),
        ],
    },
    ToolSpec {
        name: "create-sui-transaction",
        method: ToolMethod::Get,
        summary: "Create a SUI transfer request for generate-sui-tx",
        params: &[
            required("recipient", "Sui address of the recipient"),
            number("amount", true, "Amount of SUI to send"),
            network(Network::Devnet),
            optional("type", "Transfer kind, 'transfer' when omitted"),
        ],
    },
    ToolSpec {
        name: "transfer-sui-nft",
        method: ToolMethod::Get,
        summary: "Validate an NFT transfer; answers 501 with guidance",
        params: &[
            required("objectId", "Object id of the NFT"),
            required("recipient", "Sui address of the recipient"),
            network(Network::Devnet),
        ],
    },
    ToolSpec {
        name: "sui-balance",
        method: ToolMethod::Get,
        summary: "Read the SUI balance and coin types of an address",
        params: &[
            required("address", "Sui address to inspect"),
            network(Network::Devnet),
        ],
    },
    ToolSpec {
        name: "sui-portfolio",
        method: ToolMethod::Get,
        summary: "Summarise the coins, NFTs and other objects held by an address",
        params: &[
            USER_ADDRESS,
            network(Network::Testnet),
            ParamSpec {
                name: "includePrices",
                kind: ParamKind::Boolean,
                required: false,
                description: "Attach the SUI price in USD (mainnet only)",
            },
        ],
    },
    ToolSpec {
        name: "crypto-prices",
        method: ToolMethod::Get,
        summary: "Read market data for cryptocurrencies from CoinGecko",
        params: &[
            optional("coins", "Comma-separated CoinGecko ids"),
            optional("currency", "Quote currency, usd when omitted"),
            number("limit", false, "Number of coins to return (1-50)"),
        ],
    },
    ToolSpec {
        name: "mint-nft",
        method: ToolMethod::Get,
        summary: "Build a transaction minting a marketplace NFT",
        params: &[
            USER_ADDRESS,
            required("name", "NFT name"),
            required("description", "NFT description"),
            required("imageUrl", "NFT image URL"),
            network(Network::Testnet),
        ],
    },
    ToolSpec {
        name: "list-nft",
        method: ToolMethod::Get,
        summary: "Build a transaction listing an NFT on the marketplace",
        params: &[
            USER_ADDRESS,
            required("nftId", "Object id of the NFT"),
            number("price", true, "Listing price in SUI"),
            network(Network::Testnet),
        ],
    },
    ToolSpec {
        name: "buy-nft",
        method: ToolMethod::Get,
        summary: "Build a transaction buying a listed NFT",
        params: &[
            USER_ADDRESS,
            required("nftId", "Object id of the NFT"),
            number("paymentAmount", true, "Payment in SUI"),
            network(Network::Testnet),
        ],
    },
    ToolSpec {
        name: "create-kiosk",
        method: ToolMethod::Get,
        summary: "Build a transaction creating a kiosk",
        params: &[USER_ADDRESS, network(Network::Testnet)],
    },
    ToolSpec {
        name: "check-nft-wallet",
        method: ToolMethod::Get,
        summary: "List the marketplace NFTs and kiosk caps owned by an address",
        params: &[USER_ADDRESS, network(Network::Testnet)],
    },
    ToolSpec {
        name: "test-sui-call",
        method: ToolMethod::Get,
        summary: "Return a sample Move call request for wallet testing",
        params: &[network(Network::Testnet)],
    },
    ToolSpec {
        name: "mint-pet",
        method: ToolMethod::Post,
        summary: "Build a transaction minting a pet NFT",
        params: &[
            USER_ADDRESS,
            required("petName", "Name of the pet"),
            required("petType", "dog, cat or dragon"),
            network(Network::Testnet),
        ],
    },
    ToolSpec {
        name: "create-nft",
        method: ToolMethod::Get,
        summary: "Return a Move call request minting a devnet NFT",
        params: &[
            required("name", "NFT name"),
            required("description", "NFT description"),
            required("imageUrl", "NFT image URL"),
            required("recipient", "Sui address of the recipient"),
            network(Network::Devnet),
        ],
    },
    ToolSpec {
        name: "sui-swap",
        method: ToolMethod::Get,
        summary: "Build a swap transaction between two Sui tokens",
        params: &[
            USER_ADDRESS,
            required("tokenFrom", "Token to sell (symbol or coin type)"),
            required("tokenTo", "Token to buy (symbol or coin type)"),
            number("amountIn", true, "Amount of tokenFrom to sell"),
            number("slippageTolerance", false, "Slippage in percent, 0.5 when omitted"),
            network(Network::Testnet),
        ],
    },
    ToolSpec {
        name: "swap-token",
        method: ToolMethod::Get,
        summary: "Build a Cetus swap transaction",
        params: &[
            USER_ADDRESS,
            required("tokenFrom", "Token to sell (symbol or coin type)"),
            required("tokenTo", "Token to buy (symbol or coin type)"),
            number("amountIn", true, "Amount of tokenFrom to sell"),
            number("minAmountOut", false, "Minimum amount of tokenTo to receive"),
            number("slippageTolerance", false, "Slippage in percent, 0.5 when omitted"),
            optional("poolId", "Cetus pool object id"),
            network(Network::Testnet),
        ],
    },
];

fn schema(kind: ParamKind) -> Value {
    match kind {
        ParamKind::String => json!({ "type": "string" }),
        ParamKind::Number => json!({ "type": "number" }),
        ParamKind::Boolean => json!({ "type": "boolean" }),
        ParamKind::Network(default) => json!({
            "type": "string",
            "enum": Network::ALL,
            "default": default,
        }),
    }
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string", "description": "Error message" },
                        "details": { "type": "string" }
                    }
                }
            }
        }
    })
}

fn operation(tool: &ToolSpec) -> Value {
    let mut op = json!({
        "operationId": tool.name,
        "summary": tool.summary,
        "description": tool.summary,
        "responses": {
            "200": {
                "description": "Successful response",
                "content": { "application/json": { "schema": { "type": "object" } } }
            },
            "400": error_response("Bad request"),
            "500": error_response("Server error"),
        },
    });

    match tool.method {
        ToolMethod::Get => {
            let parameters: Vec<Value> = tool
                .params
                .iter()
                .map(|p| {
                    json!({
                        "name": p.name,
                        "in": "query",
                        "required": p.required,
                        "schema": schema(p.kind),
                        "description": p.description,
                    })
                })
                .collect();
            op["parameters"] = Value::Array(parameters);
        }
        ToolMethod::Post => {
            let properties: Map<String, Value> = tool
                .params
                .iter()
                .map(|p| {
                    let mut s = schema(p.kind);
                    s["description"] = json!(p.description);
                    (p.name.to_string(), s)
                })
                .collect();
            let required: Vec<&str> = tool
                .params
                .iter()
                .filter(|p| p.required)
                .map(|p| p.name)
                .collect();
            op["requestBody"] = json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": properties,
                            "required": required,
                        }
                    }
                }
            });
        }
    }
    op
}

pub fn manifest(config: &Config) -> Value {
    let base_url = config.base_url.trim_end_matches('/');
    let paths: Map<String, Value> = TOOLS
        .iter()
        .map(|tool| {
            let method = match tool.method {
                ToolMethod::Get => "get",
                ToolMethod::Post => "post",
            };
            let mut item = Map::new();
            item.insert(method.to_string(), operation(tool));
            (format!("/api/tools/{}", tool.name), Value::Object(item))
        })
        .collect();

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Miko Agent",
            "description": "API for the Miko Agent",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "servers": [{ "url": base_url }],
        "x-mb": {
            "account-id": &config.account_id,
            "assistant": {
                "name": ASSISTANT_NAME,
                "description": ASSISTANT_DESCRIPTION,
                "instructions": ASSISTANT_INSTRUCTIONS,
                "tools": [
                    { "type": "generate-transaction" },
                    { "type": "generate-evm-tx" },
                    { "type": "generate-sui-tx" },
                    { "type": "sign-message" }
                ],
                "image": format!("{base_url}/avatar.png"),
                "repo": "https://github.com/BitteProtocol/agent-next-boilerplate",
                "categories": ["DeFi", "DAO", "NFT", "Social"],
                "chainIds": [1, 8453],
            },
        },
        "paths": paths,
    })
}

/// GET /api/ai-plugin and /.well-known/ai-plugin.json
pub async fn ai_plugin_handler(State(state): State<AppState>) -> Json<Value> {
    Json(manifest(&state.config))
}
