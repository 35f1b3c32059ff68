//! End-to-end tests for the tool endpoints. The Sui fullnode and CoinGecko
//! are replaced with mockito servers.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64STD, Engine};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use tower::ServiceExt;

use bitte_sui_agent::{
    api::create_app,
    blockchain::Network,
    config::Config,
    AppState,
};

const OWNER: &str = "0x7d20dcdb2bca4f508ea9613994683eb4e76e9c4ed371169677c1be02aaf0b58e";
const PACKAGE: &str = "0x5ea6aafe995ce6506f07335a40942024106a57f6311cb341239abf2c3ac7b82f";

fn app(config: Config) -> Router {
    create_app(AppState::new(config))
}

/// Config whose Sui traffic for every network goes to `server`.
fn config_for(server: &ServerGuard) -> Config {
    let mut config = Config::default();
    for network in Network::ALL {
        config.sui_rpc_overrides.insert(network, server.url());
    }
    config
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn rpc_result(result: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

const MARKETPLACE: &str = "0x9a3c1f0e5d2b47a68c0f4e1d2b3a5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d";
const NFT: &str = "0x1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f901";
const GAS_COIN: &str = "0xc0ffee00000000000000000000000000000000000000000000000000000000c1";

async fn mock_rpc(server: &mut ServerGuard, method: &str, result: Value) -> Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": method })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(result))
        .create_async()
        .await
}

fn dry_run_result(status: &str, error: Option<&str>) -> Value {
    json!({
        "effects": {
            "status": { "status": status, "error": error },
            "gasUsed": {
                "computationCost": "1000000",
                "storageCost": "2000000",
                "storageRebate": "500000"
            }
        }
    })
}

fn gas_coins() -> Value {
    json!({
        "data": [{
            "coinType": "0x2::sui::SUI",
            "coinObjectId": GAS_COIN,
            "version": "31",
            "digest": bs58::encode([9u8; 32]).into_string(),
            "balance": "5000000000"
        }],
        "nextCursor": null,
        "hasNextPage": false
    })
}

fn id_bytes(id: &str) -> Vec<u8> {
    hex::decode(id.trim_start_matches("0x")).unwrap()
}

fn nft_config(server: &ServerGuard) -> Config {
    let mut config = config_for(server);
    config.nft_package_id = Some(PACKAGE.into());
    config.nft_marketplace_id = Some(MARKETPLACE.into());
    config
}

fn decoded_transaction(value: &Value) -> Vec<u8> {
    BASE64STD.decode(value.as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(app(Config::default()), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn manifest_is_served_on_both_paths() {
    let config = Config {
        account_id: "miko.near".into(),
        ..Config::default()
    };
    let (status, well_known) = get(app(config.clone()), "/.well-known/ai-plugin.json").await;
    assert_eq!(status, StatusCode::OK);
    let (_, api) = get(app(config), "/api/ai-plugin").await;
    assert_eq!(well_known, api);

    assert_eq!(well_known["x-mb"]["account-id"], "miko.near");
    let paths = well_known["paths"].as_object().unwrap();
    for tool in ["sui-swap", "swap-token", "mint-nft", "sui-portfolio", "create-evm-transaction"] {
        assert!(paths.contains_key(&format!("/api/tools/{tool}")), "missing {tool}");
    }
}

#[tokio::test]
async fn rejects_unknown_networks() {
    let (status, body) = get(
        app(Config::default()),
        "/api/tools/create-sui-transaction?recipient=0x12345678ab&amount=1&network=moonnet",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_NETWORK");
}

#[tokio::test]
async fn reports_missing_parameters() {
    let (status, body) = get(app(Config::default()), "/api/tools/create-sui-transaction?amount=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Recipient address is required");
}

#[tokio::test]
async fn creates_sui_transfer_requests() {
    let uri = format!("/api/tools/create-sui-transaction?recipient={OWNER}&amount=1.5");
    let (status, body) = get(app(Config::default()), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["amountInMist"], "1500000000");
    assert_eq!(body["network"], "devnet");
    assert_eq!(body["suiSignRequest"]["recipientAddress"], OWNER);
    assert_eq!(body["suiSignRequest"]["amountInSui"], 1.5);
    assert!(body["bitteInstruction"]
        .as_str()
        .unwrap()
        .contains("generate-sui-tx"));
}

#[tokio::test]
async fn rejects_non_positive_amounts() {
    let uri = format!("/api/tools/create-sui-transaction?recipient={OWNER}&amount=0");
    let (status, body) = get(app(Config::default()), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid amount. Must be a positive number");
}

#[tokio::test]
async fn nft_transfers_are_not_implemented() {
    let uri = format!("/api/tools/transfer-sui-nft?objectId={PACKAGE}&recipient={OWNER}");
    let (status, body) = get(app(Config::default()), &uri).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["success"], false);
    assert_eq!(body["requestedOperation"]["objectId"], PACKAGE);
}

#[tokio::test]
async fn near_transfers_use_yocto_deposits() {
    let (status, body) = get(
        app(Config::default()),
        "/api/tools/create-near-transaction?receiverId=alice.near&amount=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactionPayload"]["receiverId"], "alice.near");
    assert_eq!(
        body["transactionPayload"]["actions"][0],
        json!({ "type": "Transfer", "params": { "deposit": "1000000000000000000000000" } })
    );
}

#[tokio::test]
async fn evm_transfers_encode_hex_wei() {
    let (status, body) = get(
        app(Config::default()),
        "/api/tools/create-evm-transaction?to=0x52908400098527886e0f7030069857d2e4169ee7&amount=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chainId"], 1);
    assert_eq!(
        body["evmSignRequest"],
        json!({
            "to": "0x52908400098527886E0F7030069857D2E4169EE7",
            "value": "0xde0b6b3a7640000",
            "data": "0x",
        })
    );

    let (status, _) = get(
        app(Config::default()),
        "/api/tools/create-evm-transaction?to=0x1234&amount=1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn builds_personal_sign_requests() {
    let (status, body) = get(
        app(Config::default()),
        "/api/tools/eth-sign-request?evmAddress=0x52908400098527886e0f7030069857d2e4169ee7&method=personal_sign",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let request = &body["evmSignRequest"];
    assert_eq!(request["method"], "personal_sign");
    assert_eq!(request["chainId"], 8453);
    // hex("Hello Bitte")
    assert_eq!(request["params"][0], "0x48656c6c6f204269747465");
}

#[tokio::test]
async fn mint_nft_requires_a_configured_package() {
    let mut server = Server::new_async().await;
    let rpc = server
        .mock("POST", "/")
        .expect(0)
        .create_async()
        .await;

    let uri = format!(
        "/api/tools/mint-nft?userAddress={OWNER}&name=Miko&description=Cat&imageUrl=https://example.com/miko.png"
    );
    let (status, body) = get(app(config_for(&server)), &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "NFT_PACKAGE_ID not configured in environment variables"
    );
    rpc.assert_async().await;
}

#[tokio::test]
async fn sui_swap_rejects_insufficient_balance() {
    let mut server = Server::new_async().await;
    let balance = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "suix_getBalance" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "coinType": "0x2::sui::SUI",
            "coinObjectCount": 1,
            "totalBalance": "500000000",
            "lockedBalance": {}
        })))
        .create_async()
        .await;

    let (status, body) = post(
        app(config_for(&server)),
        "/api/tools/sui-swap",
        json!({
            "userAddress": OWNER,
            "tokenFrom": "SUI",
            "tokenTo": "USDC",
            "amountIn": "1.0",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_SUI_BALANCE");
    assert_eq!(body["requiredAmount"], "1.0");
    assert_eq!(body["currentBalance"], "0.5000 SUI");
    balance.assert_async().await;
}

#[tokio::test]
async fn sui_swap_rejects_same_token_before_any_read() {
    let mut server = Server::new_async().await;
    let rpc = server.mock("POST", "/").expect(0).create_async().await;

    let uri = format!("/api/tools/sui-swap?userAddress={OWNER}&tokenFrom=SUI&tokenTo=sui&amountIn=1");
    let (status, body) = get(app(config_for(&server)), &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SAME_TOKEN_SWAP");
    rpc.assert_async().await;
}

#[tokio::test]
async fn swap_token_rejects_unknown_pools() {
    let uri = format!("/api/tools/swap-token?userAddress={OWNER}&tokenFrom=USDC&tokenTo=CETUS&amountIn=1");
    let (status, body) = get(app(Config::default()), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "POOL_NOT_FOUND");
}

#[tokio::test]
async fn sui_balance_summarises_coins() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "suix_getBalance" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "coinType": "0x2::sui::SUI",
            "coinObjectCount": 2,
            "totalBalance": "2500000000"
        })))
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "suix_getAllCoins" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "data": [
                {
                    "coinType": "0x2::sui::SUI",
                    "coinObjectId": "0xc1",
                    "version": "7",
                    "digest": "HdfF8Ztbr1zBgJ4kaGRnTEf6WNVvnKLy1Xq6ko1Gq1Xh",
                    "balance": "2000000000"
                },
                {
                    "coinType": "0x2::sui::SUI",
                    "coinObjectId": "0xc2",
                    "version": "9",
                    "digest": "HdfF8Ztbr1zBgJ4kaGRnTEf6WNVvnKLy1Xq6ko1Gq1Xh",
                    "balance": "500000000"
                }
            ],
            "nextCursor": null,
            "hasNextPage": false
        })))
        .create_async()
        .await;

    let uri = format!("/api/tools/sui-balance?address={OWNER}&network=testnet");
    let (status, body) = get(app(config_for(&server)), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], OWNER);
    assert_eq!(body["network"], "testnet");
    assert_eq!(body["suiBalance"], "2.500000");
    assert_eq!(body["totalCoins"], 2);
    assert_eq!(body["hasNextPage"], false);
}

#[tokio::test]
async fn portfolio_survives_a_price_outage() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "suix_getBalance" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "coinType": "0x2::sui::SUI",
            "coinObjectCount": 1,
            "totalBalance": "1000000000"
        })))
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "suix_getAllCoins" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "data": [{
                "coinType": "0x2::sui::SUI",
                "coinObjectId": "0xc1",
                "version": "7",
                "digest": "HdfF8Ztbr1zBgJ4kaGRnTEf6WNVvnKLy1Xq6ko1Gq1Xh",
                "balance": "1000000000"
            }],
            "nextCursor": null,
            "hasNextPage": false
        })))
        .create_async()
        .await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "suix_getOwnedObjects" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!({
            "data": [{
                "data": {
                    "objectId": "0xab",
                    "version": "3",
                    "digest": "HdfF8Ztbr1zBgJ4kaGRnTEf6WNVvnKLy1Xq6ko1Gq1Xh",
                    "type": "0x2::kiosk::KioskOwnerCap",
                    "content": {
                        "dataType": "moveObject",
                        "type": "0x2::kiosk::KioskOwnerCap",
                        "hasPublicTransfer": true,
                        "fields": { "for": "0xcd" }
                    }
                }
            }],
            "nextCursor": null,
            "hasNextPage": false
        })))
        .create_async()
        .await;

    let mut coingecko = Server::new_async().await;
    let price = coingecko
        .mock("GET", "/simple/price")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let mut config = config_for(&server);
    config.coingecko_api_url = coingecko.url();
    let (status, body) = post(
        app(config),
        "/api/tools/sui-portfolio",
        json!({ "userAddress": OWNER, "network": "mainnet", "includePrices": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["priceData"].is_null());
    assert_eq!(body["data"]["summary"]["totalOtherObjects"], 1);
    assert_eq!(body["data"]["otherObjects"][0]["id"], "0xab");
    price.assert_async().await;
}

#[tokio::test]
async fn crypto_prices_reshape_market_data() {
    let mut coingecko = Server::new_async().await;
    coingecko
        .mock("GET", "/coins/markets")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("vs_currency".into(), "eur".into()),
            Matcher::UrlEncoded("ids".into(), "sui".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            json!([{
                "id": "sui",
                "symbol": "sui",
                "name": "Sui",
                "current_price": 3.21,
                "market_cap": 9000000000u64,
                "market_cap_rank": 12,
                "price_change_percentage_24h": -1.5,
                "total_volume": 500000000u64,
                "circulating_supply": 3000000000u64
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let config = Config {
        coingecko_api_url: coingecko.url(),
        ..Config::default()
    };
    let (status, body) = get(app(config), "/api/tools/crypto-prices?coins=sui&currency=EUR").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["data"][0]["symbol"], "SUI");
    assert_eq!(body["data"][0]["price"], 3.21);
}

#[tokio::test]
async fn mint_pet_rejects_unknown_pet_types() {
    let (status, body) = post(
        app(Config::default()),
        "/api/tools/mint-pet",
        json!({ "userAddress": OWNER, "petName": "Rex", "petType": "hamster" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid pet type. Supported types: dog, cat, dragon"
    );
}

#[tokio::test]
async fn utility_tools_answer() {
    let (status, body) = get(app(Config::default()), "/api/tools/coinflip").await;
    assert_eq!(status, StatusCode::OK);
    assert!(matches!(body["result"].as_str(), Some("heads" | "tails")));

    let (_, body) = get(
        app(Config::default()),
        "/api/tools/get-user?accountId=alice.near",
    )
    .await;
    assert_eq!(body, json!({ "accountId": "alice.near", "evmAddress": "" }));

    let (status, body) = get(app(Config::default()), "/api/tools/twitter").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text is required");

    let (_, body) = get(app(Config::default()), "/api/tools/twitter?text=gm").await;
    assert_eq!(
        body["twitterIntentUrl"],
        "https://twitter.com/intent/tweet?text=gm"
    );
}

#[tokio::test]
async fn list_nft_builds_shared_and_owned_inputs() {
    let mut server = Server::new_async().await;
    let objects = mock_rpc(
        &mut server,
        "sui_multiGetObjects",
        json!([
            {
                "data": {
                    "objectId": MARKETPLACE,
                    "version": "40",
                    "digest": bs58::encode([3u8; 32]).into_string(),
                    "owner": { "Shared": { "initial_shared_version": 12 } }
                }
            },
            {
                "data": {
                    "objectId": NFT,
                    "version": "27",
                    "digest": bs58::encode([7u8; 32]).into_string(),
                    "owner": { "AddressOwner": OWNER }
                }
            }
        ]),
    )
    .await;
    let price = mock_rpc(&mut server, "suix_getReferenceGasPrice", json!("1000")).await;
    let dry_run = mock_rpc(
        &mut server,
        "sui_dryRunTransactionBlock",
        dry_run_result("success", None),
    )
    .await;
    let coins = mock_rpc(&mut server, "suix_getCoins", gas_coins()).await;

    let uri = format!("/api/tools/list-nft?userAddress={OWNER}&nftId={NFT}&price=2.5");
    let (status, body) = get(app(nft_config(&server)), &uri).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["priceInMist"], "2500000000");
    assert_eq!(body["data"]["marketplaceId"], MARKETPLACE);
    assert_eq!(
        body["suiSignRequest"]["transactionBytes"],
        body["data"]["suiTransactionBytes"]
    );

    let bytes = decoded_transaction(&body["data"]["suiTransactionBytes"]);
    // V1, ProgrammableTransaction, three inputs
    assert_eq!(&bytes[..3], &[0, 0, 3]);
    // marketplace: Object(SharedObject { id, initial_shared_version, mutable })
    assert_eq!(&bytes[3..5], &[1, 1]);
    assert_eq!(&bytes[5..37], id_bytes(MARKETPLACE).as_slice());
    assert_eq!(&bytes[37..45], &12u64.to_le_bytes());
    assert_eq!(bytes[45], 1);
    // nft: Object(ImmOrOwnedObject((id, version, digest)))
    assert_eq!(&bytes[46..48], &[1, 0]);
    assert_eq!(&bytes[48..80], id_bytes(NFT).as_slice());
    assert_eq!(&bytes[80..88], &27u64.to_le_bytes());
    assert_eq!(bytes[88], 32);
    assert_eq!(&bytes[89..121], &[7u8; 32]);
    // price: Pure(u64)
    assert_eq!(&bytes[121..123], &[0, 8]);
    assert_eq!(&bytes[123..131], &2_500_000_000u64.to_le_bytes());

    let gas_coin = id_bytes(GAS_COIN);
    assert!(bytes.windows(32).any(|w| w == gas_coin.as_slice()));

    objects.assert_async().await;
    price.assert_async().await;
    dry_run.assert_async().await;
    coins.assert_async().await;
}

#[tokio::test]
async fn list_nft_reports_failed_dry_runs() {
    let mut server = Server::new_async().await;
    mock_rpc(
        &mut server,
        "sui_multiGetObjects",
        json!([
            {
                "data": {
                    "objectId": MARKETPLACE,
                    "version": "40",
                    "digest": bs58::encode([3u8; 32]).into_string(),
                    "owner": { "Shared": { "initial_shared_version": "12" } }
                }
            },
            {
                "data": {
                    "objectId": NFT,
                    "version": "27",
                    "digest": bs58::encode([7u8; 32]).into_string(),
                    "owner": { "AddressOwner": OWNER }
                }
            }
        ]),
    )
    .await;
    mock_rpc(&mut server, "suix_getReferenceGasPrice", json!(1000)).await;
    mock_rpc(
        &mut server,
        "sui_dryRunTransactionBlock",
        dry_run_result("failure", Some("MoveAbort(list_nft, 3)")),
    )
    .await;
    let coins = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "suix_getCoins" })))
        .expect(0)
        .create_async()
        .await;

    let uri = format!("/api/tools/list-nft?userAddress={OWNER}&nftId={NFT}&price=2.5");
    let (status, body) = get(app(nft_config(&server)), &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create list NFT transaction");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("Dry run failed"), "{details}");
    assert!(details.contains("MoveAbort(list_nft, 3)"), "{details}");
    coins.assert_async().await;
}

#[tokio::test]
async fn sui_swap_reports_the_fallback_as_no_swap() {
    let mut server = Server::new_async().await;
    mock_rpc(
        &mut server,
        "suix_getBalance",
        json!({
            "coinType": "0x2::sui::SUI",
            "coinObjectCount": 1,
            "totalBalance": "5000000000",
            "lockedBalance": {}
        }),
    )
    .await;
    mock_rpc(&mut server, "suix_getReferenceGasPrice", json!("1000")).await;
    // The first dry run (the swap route) fails, the second (the fallback) succeeds.
    let rejected = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "sui_dryRunTransactionBlock" })))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(dry_run_result(
            "failure",
            Some("InvalidPublicFunctionReturnType"),
        )))
        .expect(1)
        .create_async()
        .await;
    let accepted = mock_rpc(
        &mut server,
        "sui_dryRunTransactionBlock",
        dry_run_result("success", None),
    )
    .await;
    mock_rpc(&mut server, "suix_getCoins", gas_coins()).await;

    let (status, body) = post(
        app(config_for(&server)),
        "/api/tools/sui-swap",
        json!({
            "userAddress": OWNER,
            "tokenFrom": "SUI",
            "tokenTo": "USDC",
            "amountIn": "1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["fallbackUsed"], true);
    assert_eq!(body["data"]["swapExecuted"], false);
    assert!(body["data"].get("packageId").is_none());
    assert!(body["data"]["swap"].get("estimatedOutput").is_none());
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("No swap executed"));

    let bytes = decoded_transaction(&body["data"]["suiTransactionBytes"]);
    // split amount and recipient, both pure
    assert_eq!(&bytes[..5], &[0, 0, 2, 0, 8]);
    assert_eq!(&bytes[5..13], &1_000_000_000u64.to_le_bytes());

    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn nft_tools_require_configured_ids() {
    let mut server = Server::new_async().await;
    let rpc = server.mock("POST", "/").expect(0).create_async().await;

    let missing_package = [
        format!("/api/tools/list-nft?userAddress={OWNER}&nftId={NFT}&price=1"),
        format!("/api/tools/buy-nft?userAddress={OWNER}&nftId={NFT}&paymentAmount=1"),
        format!("/api/tools/create-kiosk?userAddress={OWNER}"),
        format!("/api/tools/check-nft-wallet?userAddress={OWNER}"),
    ];
    for uri in &missing_package {
        let (status, body) = get(app(config_for(&server)), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(
            body["error"],
            "NFT_PACKAGE_ID not configured in environment variables",
            "{uri}"
        );
    }

    let mut config = config_for(&server);
    config.nft_package_id = Some(PACKAGE.into());
    for uri in &missing_package[..2] {
        let (status, body) = get(app(config.clone()), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(
            body["error"],
            "NFT_MARKETPLACE_ID not configured in environment variables",
            "{uri}"
        );
    }
    rpc.assert_async().await;
}

#[tokio::test]
async fn list_nft_accepts_exponent_prices_in_json_bodies() {
    let (status, body) = post(
        app(Config::default()),
        "/api/tools/list-nft",
        json!({ "userAddress": OWNER, "nftId": NFT, "price": 0.0000001 }),
    )
    .await;
    // Past amount validation, stopped by the missing package id.
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
    assert_eq!(
        body["error"],
        "NFT_PACKAGE_ID not configured in environment variables"
    );
}

#[tokio::test]
async fn rejects_amounts_below_one_base_unit() {
    let uri = format!("/api/tools/create-sui-transaction?recipient={OWNER}&amount=0.0000000001");
    let (status, body) = get(app(Config::default()), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid amount. Must be a positive number");
    assert!(body["details"].as_str().unwrap().contains("smallest unit"));

    let mut server = Server::new_async().await;
    let rpc = server.mock("POST", "/").expect(0).create_async().await;
    let uri = format!("/api/tools/list-nft?userAddress={OWNER}&nftId={NFT}&price=0.0000000001");
    let (status, body) = get(app(nft_config(&server)), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Price must be a positive number in SUI");
    rpc.assert_async().await;
}

#[tokio::test]
async fn rejects_malformed_addresses_before_any_read() {
    let (status, body) = get(
        app(Config::default()),
        "/api/tools/create-sui-transaction?recipient=bob&amount=1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid recipient address format. Must be a valid Sui address starting with 0x"
    );

    let mut server = Server::new_async().await;
    let rpc = server.mock("POST", "/").expect(0).create_async().await;
    let (status, body) = get(app(config_for(&server)), "/api/tools/sui-balance?address=bob").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid address format. Must be a valid Sui address starting with 0x"
    );
    rpc.assert_async().await;
}

#[tokio::test]
async fn sui_swap_treats_long_form_sui_as_the_same_token() {
    let mut server = Server::new_async().await;
    let rpc = server.mock("POST", "/").expect(0).create_async().await;

    let uri = format!(
        "/api/tools/sui-swap?userAddress={OWNER}&tokenFrom=SUI&tokenTo=0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI&amountIn=1"
    );
    let (status, body) = get(app(config_for(&server)), &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SAME_TOKEN_SWAP");
    rpc.assert_async().await;
}
