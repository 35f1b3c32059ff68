//! # API Module
//!
//! HTTP handlers for the agent tools. Every tool lives under
//! `/api/tools/<tool-name>`; `GET` reads the query string and `POST`
//! (where offered) reads a JSON object body.
//!
//! ## Available Endpoints
//!
//! ### Value transfers
//! - `create-sui-transaction`, `create-near-transaction`, `create-evm-transaction`
//! - `eth-sign-request`
//! - `transfer-sui-nft` (always 501)
//!
//! ### NFT marketplace
//! - `mint-nft`, `list-nft`, `buy-nft`, `create-kiosk`, `check-nft-wallet`
//! - `test-sui-call`, `mint-pet`, `create-nft`
//!
//! ### Swaps
//! - `sui-swap`, `swap-token`
//!
//! ### Read-only
//! - `sui-balance`, `sui-portfolio`, `crypto-prices`
//!
//! ### Agent utilities
//! - `get-blockchains`, `get-user`, `twitter`, `coinflip`

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub mod evm;
pub mod health;
pub mod misc;
pub mod near;
pub mod nft;
pub mod params;
pub mod plugin;
pub mod portfolio;
pub mod prices;
pub mod response;
pub mod sui_balance;
pub mod sui_transaction;
pub mod swap;

/// Routes relative to `/api/tools`.
pub fn create_tools_router() -> Router<AppState> {
    Router::new()
        // Value transfers
        .route(
            "/create-sui-transaction",
            get(sui_transaction::create_sui_transaction_handler),
        )
        .route(
            "/transfer-sui-nft",
            get(sui_transaction::transfer_sui_nft_handler),
        )
        .route(
            "/create-near-transaction",
            get(near::create_near_transaction_handler),
        )
        .route(
            "/create-evm-transaction",
            get(evm::create_evm_transaction_handler),
        )
        .route("/eth-sign-request", get(evm::eth_sign_request_handler))
        // NFT marketplace
        .route(
            "/mint-nft",
            get(nft::mint_nft_handler).post(nft::mint_nft_handler),
        )
        .route(
            "/list-nft",
            get(nft::list_nft_handler).post(nft::list_nft_handler),
        )
        .route(
            "/buy-nft",
            get(nft::buy_nft_handler).post(nft::buy_nft_handler),
        )
        .route(
            "/create-kiosk",
            get(nft::create_kiosk_handler).post(nft::create_kiosk_handler),
        )
        .route(
            "/check-nft-wallet",
            get(nft::check_nft_wallet_handler).post(nft::check_nft_wallet_handler),
        )
        .route("/test-sui-call", get(nft::test_sui_call_handler))
        .route("/mint-pet", post(nft::mint_pet_handler))
        .route("/create-nft", get(nft::create_nft_handler))
        // Swaps
        .route(
            "/sui-swap",
            get(swap::sui_swap_handler).post(swap::sui_swap_handler),
        )
        .route(
            "/swap-token",
            get(swap::swap_token_handler).post(swap::swap_token_handler),
        )
        // Read-only queries
        .route("/sui-balance", get(sui_balance::sui_balance_handler))
        .route(
            "/sui-portfolio",
            get(portfolio::sui_portfolio_handler).post(portfolio::sui_portfolio_handler),
        )
        .route("/crypto-prices", get(prices::crypto_prices_handler))
        // Agent utilities
        .route("/get-blockchains", get(misc::get_blockchains_handler))
        .route("/get-user", get(misc::get_user_handler))
        .route("/twitter", get(misc::twitter_handler))
        .route("/coinflip", get(misc::coinflip_handler))
}

/// The full application: tools, health and the agent manifest.
pub fn create_app(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/ai-plugin", get(plugin::ai_plugin_handler))
        .nest("/tools", create_tools_router());

    Router::new()
        .nest("/api", api_router)
        .route("/.well-known/ai-plugin.json", get(plugin::ai_plugin_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
