// src/main.rs

use std::net::SocketAddr;

use bitte_sui_agent::{api, config::Config, AppState};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn run_http_server(state: AppState) {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = api::create_app(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return;
        }
    };
    info!("🚀 HTTP Server listening on {}", addr);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitte_sui_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    if config.nft_package_id.is_none() {
        info!("NFT_PACKAGE_ID not set; marketplace tools will answer 500");
    }

    run_http_server(AppState::new(config)).await;
}
