//! Small utility tools listed alongside the chain tools in the manifest.

use axum::Json;
use serde_json::{json, Value};
use url::Url;

use crate::api::{
    params::ToolParams,
    response::{ToolError, ToolResult},
};
use crate::utils::require;

const TWITTER_INTENT_URL: &str = "https://twitter.com/intent/tweet";

/// GET /api/tools/get-blockchains
pub async fn get_blockchains_handler() -> Json<Value> {
    Json(json!({
        "message": "This agent builds transactions for Sui (mainnet, testnet, devnet), NEAR and EVM chains (Ethereum, Base).",
    }))
}

/// GET /api/tools/get-user
pub async fn get_user_handler(params: ToolParams) -> Json<Value> {
    Json(json!({
        "accountId": params.str("accountId").unwrap_or_default(),
        "evmAddress": params.str("evmAddress").unwrap_or_default(),
    }))
}

/// Tweet intent link; empty optional fields are left out of the query.
pub fn twitter_intent_url(
    text: &str,
    url: Option<&str>,
    hashtags: Option<&str>,
    via: Option<&str>,
) -> ToolResult<String> {
    let optional = [("url", url), ("hashtags", hashtags), ("via", via)];
    let query = std::iter::once(("text", text))
        .chain(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
    let intent = Url::parse_with_params(TWITTER_INTENT_URL, query).map_err(|e| {
        ToolError::Upstream {
            context: "Failed to generate Twitter intent URL",
            details: e.into(),
        }
    })?;
    Ok(intent.to_string())
}

/// GET /api/tools/twitter
pub async fn twitter_handler(params: ToolParams) -> ToolResult<Json<Value>> {
    let text = require(&params, "text", "Text")?;
    let url = params.str("url");
    let hashtags = params.str("hashtags");
    let via = params.str("via");

    let intent = twitter_intent_url(&text, url.as_deref(), hashtags.as_deref(), via.as_deref())?;
    Ok(Json(json!({ "twitterIntentUrl": intent })))
}

/// GET /api/tools/coinflip
pub async fn coinflip_handler() -> Json<Value> {
    let result = if rand::random::<bool>() { "heads" } else { "tails" };
    Json(json!({ "result": result }))
}
