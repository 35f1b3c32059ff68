//! Token swap payloads for DeepBook-style and Cetus routes.

use anyhow::{Context, Result};
use tracing::warn;

use crate::amount::{format_base_units_fixed, DecimalAmount, Rounding, MIST_PER_SUI};
use crate::blockchain::{
    client::SuiClient,
    models::{Coin, Network},
    sui_types::{SuiAddress, TypeTag, SUI_COIN_TYPE},
    transaction::TransactionBuilder,
};

pub const DEEPBOOK_PACKAGE: &str = "0xdee9";
/// No DeepBook pool ids are configured, so the dry run rejects this entry and
/// `sui-swap` answers with the split-and-return fallback, flagged as not swapped.
pub const DEEPBOOK_SWAP_ENTRY: &str = "0x2::coin::zero";

pub const CETUS_CLMM_PACKAGE: &str =
    "0x0c7ae833c220aa73a3643a0d508afa4ac5d50d97312ea4584e35f9eb21b9df12";
pub const CETUS_INTEGRATE_PACKAGE: &str =
    "0x2918cf39850de6d5d94d8196dc878c8c722cd79db659318e00bff57fbb4e2ede";
pub const CETUS_GLOBAL_CONFIG: &str =
    "0xf5ff7d5ba73b581bca6b4b9fa0049cd320360abd154b809f8700a8fd3cfaf7ca";

/// Gas reserved on top of a SUI swap amount, in MIST (0.01 SUI).
pub const SWAP_GAS_BUFFER_MIST: u128 = MIST_PER_SUI / 100;
pub const SWAP_GAS_ESTIMATE_SUI: f64 = 0.01;
pub const DEFAULT_SLIPPAGE: &str = "0.5";
pub const MAX_SLIPPAGE_PERCENT: f64 = 50.0;
/// Output estimate after the assumed 0.2% pool fee.
pub const ESTIMATED_RATE: f64 = 0.998;

pub struct Token {
    pub symbol: &'static str,
    pub coin_type: &'static str,
    pub decimals: u32,
}

pub static TOKENS: [Token; 5] = [
    Token { symbol: "SUI", coin_type: SUI_COIN_TYPE, decimals: 9 },
    Token {
        symbol: "USDC",
        coin_type: "0x5d4b302506645c37ff133b98c4b50a5ae14841659738d6d733d59d0d217a93bf::coin::COIN",
        decimals: 6,
    },
    Token {
        symbol: "USDT",
        coin_type: "0xc060006111016b8a020ad5b33834984a437aaa7d3c74c18e09a95d48aceab08c::coin::COIN",
        decimals: 6,
    },
    Token {
        symbol: "WETH",
        coin_type: "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN",
        decimals: 8,
    },
    Token {
        symbol: "CETUS",
        coin_type: "0x6864a6f921804860930db6ddbe2e16acdf8504495ea7481637a1c8b9a8fe54b::cetus::CETUS",
        decimals: 9,
    },
];

/// Placeholder framework paths some clients send for well-known tokens.
const TOKEN_ALIASES: [(&str, &str); 4] = [
    ("0x2::usdc::USDC", "USDC"),
    ("0x2::usdt::USDT", "USDT"),
    ("0x2::weth::WETH", "WETH"),
    ("0x2::cetus::CETUS", "CETUS"),
];

fn token_by_symbol(symbol: &str) -> Option<&'static Token> {
    TOKENS.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
}

/// Canonical spelling of a coin type: full-length addresses, normalised spacing.
fn canonical_type(coin_type: &str) -> Option<String> {
    coin_type.parse::<TypeTag>().ok().map(|tag| tag.to_string())
}

fn token_by_type(coin_type: &str) -> Option<&'static Token> {
    if let Some(token) = TOKENS.iter().find(|t| t.coin_type == coin_type) {
        return Some(token);
    }
    let canonical = canonical_type(coin_type)?;
    TOKENS
        .iter()
        .find(|t| canonical_type(t.coin_type).as_deref() == Some(canonical.as_str()))
}

/// True when both strings name the same Move type, however the addresses are spelled.
pub fn same_coin_type(a: &str, b: &str) -> bool {
    match (canonical_type(a), canonical_type(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

/// Resolves a shorthand to its coin type. Anything unknown, including a
/// canonical type, is returned unchanged.
pub fn normalize_token(input: &str) -> String {
    let input = input.trim();
    let alias = TOKEN_ALIASES
        .iter()
        .find(|(path, _)| *path == input)
        .map(|(_, symbol)| *symbol);
    match token_by_symbol(alias.unwrap_or(input)).or_else(|| token_by_type(input)) {
        Some(token) => token.coin_type.to_string(),
        None => input.to_string(),
    }
}

/// Known symbol, else the struct name of the type.
pub fn token_symbol(coin_type: &str) -> String {
    if let Some(token) = token_by_type(coin_type) {
        return token.symbol.to_string();
    }
    match coin_type.rsplit_once("::") {
        Some((_, name)) => name.to_string(),
        None => format!("{}...", coin_type.chars().take(8).collect::<String>()),
    }
}

pub fn token_decimals(coin_type: &str) -> u32 {
    token_by_type(coin_type).map(|t| t.decimals).unwrap_or(9)
}

/// A 400 answer produced while validating a swap.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRejection {
    pub error: String,
    pub details: String,
    pub code: &'static str,
    pub current_balance: Option<String>,
    pub suggestions: Vec<&'static str>,
}

impl SwapRejection {
    fn new(error: impl Into<String>, details: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
            code,
            current_balance: None,
            suggestions: Vec::new(),
        }
    }

    fn balance(mut self, current: impl Into<String>) -> Self {
        self.current_balance = Some(current.into());
        self
    }
}

/// Rejects identical tokens and, on testnet, pairs without SUI.
pub fn validate_pair(from: &str, to: &str, network: Network) -> Result<(), SwapRejection> {
    if same_coin_type(from, to) {
        let mut rejection = SwapRejection::new(
            "Cannot swap same token",
            "From token and to token cannot be the same",
            "SAME_TOKEN_SWAP",
        );
        rejection.suggestions = vec!["Choose different tokens to swap"];
        return Err(rejection);
    }
    if network == Network::Testnet
        && !same_coin_type(from, SUI_COIN_TYPE)
        && !same_coin_type(to, SUI_COIN_TYPE)
    {
        let mut rejection = SwapRejection::new(
            "Token not available on testnet",
            "USDC, USDT, WETH may not exist on testnet. Only SUI is guaranteed.",
            "TOKEN_NOT_AVAILABLE_TESTNET",
        );
        rejection.suggestions = vec![
            "Use SUI as one of the tokens",
            "Try on mainnet for full token support",
            "Check if testnet USDC faucet is available",
        ];
        return Err(rejection);
    }
    Ok(())
}

pub fn parse_swap_amount(raw: &str) -> Result<DecimalAmount, SwapRejection> {
    let invalid = || {
        SwapRejection::new(
            "Invalid amount",
            "Amount must be a positive number greater than 0",
            "INVALID_AMOUNT",
        )
    };
    let amount: DecimalAmount = raw.parse().map_err(|_| invalid())?;
    if amount.is_zero() {
        return Err(invalid());
    }
    let minimum: DecimalAmount = "0.001".parse().map_err(|_| invalid())?;
    if amount.less_than(&minimum) {
        return Err(SwapRejection::new(
            "Amount too small",
            "Minimum swap amount is 0.001",
            "AMOUNT_TOO_SMALL",
        ));
    }
    Ok(amount)
}

pub fn parse_slippage(raw: &str) -> Result<f64, SwapRejection> {
    match raw.parse::<DecimalAmount>() {
        Ok(slippage) if slippage.to_f64() <= MAX_SLIPPAGE_PERCENT => Ok(slippage.to_f64()),
        _ => Err(SwapRejection::new(
            "Invalid slippage tolerance",
            "Slippage must be between 0% and 50%",
            "INVALID_SLIPPAGE",
        )),
    }
}

/// Converts an amount to the token's base units, rounding down.
pub fn to_token_units(amount: &DecimalAmount, coin_type: &str) -> Result<u64> {
    let units = amount.to_base_units(token_decimals(coin_type), Rounding::Floor)?;
    u64::try_from(units).context("amount does not fit in a u64 coin value")
}

/// Confirms the owner can cover the swap. For non-SUI tokens the owner's
/// coins of that type are returned so a transaction can spend them.
pub async fn check_balance(
    client: &SuiClient,
    owner: &str,
    coin_type: &str,
    amount: &DecimalAmount,
    network: Network,
) -> Result<Vec<Coin>, SwapRejection> {
    let symbol = token_symbol(coin_type);
    let required = amount
        .to_base_units(token_decimals(coin_type), Rounding::Ceil)
        .map_err(|e| SwapRejection::new("Invalid amount", e.to_string(), "INVALID_AMOUNT"))?;

    if same_coin_type(coin_type, SUI_COIN_TYPE) {
        let balance = client
            .get_balance(owner, Some(SUI_COIN_TYPE))
            .await
            .map_err(|e| {
                SwapRejection::new(
                    "Balance check failed",
                    format!("Could not check wallet balance: {e:#}"),
                    "BALANCE_CHECK_FAILED",
                )
                .balance("Unknown")
            })?;
        let required_with_gas = required.saturating_add(SWAP_GAS_BUFFER_MIST);
        if balance.total_balance < required_with_gas {
            let have = format_base_units_fixed(balance.total_balance, 9, 4);
            return Err(SwapRejection::new(
                "Insufficient SUI balance",
                format!(
                    "Need {} SUI (including gas), but only have {} SUI",
                    format_base_units_fixed(required_with_gas, 9, 4),
                    have
                ),
                "INSUFFICIENT_SUI_BALANCE",
            )
            .balance(format!("{have} SUI")));
        }
        return Ok(Vec::new());
    }

    let coins = client.get_coins(owner, coin_type).await.map_err(|_| {
        SwapRejection::new(
            "Token balance check failed",
            format!("Could not verify {symbol} balance. Token may not exist on {network}."),
            "BALANCE_CHECK_FAILED",
        )
        .balance("Unknown")
    })?;
    if coins.data.is_empty() {
        return Err(SwapRejection::new(
            "Token not found in wallet",
            format!("You don't have any {symbol} tokens in your wallet"),
            "TOKEN_NOT_FOUND",
        )
        .balance("0"));
    }
    let total: u128 = coins.data.iter().map(|c| c.balance).sum();
    if total < required {
        let have = format_base_units_fixed(total, token_decimals(coin_type), 6);
        return Err(SwapRejection::new(
            "Insufficient token balance",
            format!("Need {amount} {symbol}, but only have {have}"),
            "INSUFFICIENT_TOKEN_BALANCE",
        )
        .balance(format!("{have} {symbol}")));
    }
    Ok(coins.data)
}

/// Estimated output and minimum output after slippage.
pub fn estimate_output(amount: f64, slippage_percent: f64) -> (f64, f64) {
    let estimated = amount * ESTIMATED_RATE;
    (estimated, estimated * (1.0 - slippage_percent / 100.0))
}

/// DeepBook route: spend from gas for SUI, or from the first owned coin.
pub fn deepbook_swap_tx(
    sender: &str,
    from: &str,
    to: &str,
    amount_units: u64,
    input_coin: Option<&str>,
) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    let coin_in = match input_coin {
        Some(coin_id) if !same_coin_type(from, SUI_COIN_TYPE) => {
            let source = tx.object(coin_id)?;
            tx.split_coin(source, amount_units)?
        }
        _ => tx.split_coin(tx.gas(), amount_units)?,
    };
    tx.move_call(DEEPBOOK_SWAP_ENTRY, &[from, to], vec![coin_in])?;
    Ok(tx)
}

/// Fallback: split `amount_units` off the source coin and send it back to the owner.
pub fn split_and_return_tx(
    sender: &str,
    source_coin: Option<&str>,
    amount_units: u64,
) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    let source = match source_coin {
        Some(coin_id) => tx.object(coin_id)?,
        None => tx.gas(),
    };
    let split = tx.split_coin(source, amount_units)?;
    tx.transfer_objects(vec![split], sender)?;
    Ok(tx)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSwap {
    pub transaction_bytes: String,
    pub fallback_used: bool,
}

/// Builds the primary route, falling back to the split-and-return
/// transaction when the primary one cannot be built.
pub async fn build_with_fallback(
    client: &SuiClient,
    max_gas_budget: u64,
    primary: &TransactionBuilder,
    fallback: &TransactionBuilder,
) -> Result<BuiltSwap> {
    match primary.build_base64(client, max_gas_budget).await {
        Ok(transaction_bytes) => Ok(BuiltSwap {
            transaction_bytes,
            fallback_used: false,
        }),
        Err(primary_err) => {
            warn!("Primary swap build failed, trying fallback: {:#}", primary_err);
            let transaction_bytes = fallback
                .build_base64(client, max_gas_budget)
                .await
                .context("fallback split-and-return transaction failed to build")?;
            Ok(BuiltSwap {
                transaction_bytes,
                fallback_used: true,
            })
        }
    }
}

// --- Cetus ---

#[derive(Debug, Clone, PartialEq)]
pub struct CetusPool {
    pub key: String,
    pub token_a: String,
    pub token_b: String,
    pub fee: u64,
    pub tick_spacing: u32,
    pub is_reversed: bool,
}

const CETUS_POOLS: [(&str, &str); 3] = [("SUI", "USDC"), ("SUI", "USDT"), ("SUI", "CETUS")];
const CETUS_FEE: u64 = 3000;
const CETUS_TICK_SPACING: u32 = 200;

/// Finds the configured pool for a pair in either direction.
pub fn find_cetus_pool(from: &str, to: &str) -> Option<CetusPool> {
    let from_symbol = token_by_type(from)?.symbol;
    let to_symbol = token_by_type(to)?.symbol;

    CETUS_POOLS.iter().find_map(|(a, b)| {
        let (token_a, token_b, is_reversed) = if (*a, *b) == (from_symbol, to_symbol) {
            (from, to, false)
        } else if (*a, *b) == (to_symbol, from_symbol) {
            (to, from, true)
        } else {
            return None;
        };
        Some(CetusPool {
            key: format!("{a}/{b}"),
            token_a: token_a.to_string(),
            token_b: token_b.to_string(),
            fee: CETUS_FEE,
            tick_spacing: CETUS_TICK_SPACING,
            is_reversed,
        })
    })
}

pub fn cetus_swap_target() -> String {
    format!("{CETUS_INTEGRATE_PACKAGE}::router::swap_exact_input")
}

/// `router::swap_exact_input<A, B>(config, coin, amount_in, min_out, fee, is_reversed, recipient)`
pub fn cetus_swap_tx(
    sender: &str,
    pool: &CetusPool,
    input_coin: &str,
    amount_units: u64,
    min_out_units: u64,
) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    let recipient = sender.parse::<SuiAddress>()?;
    let args = vec![
        tx.object(CETUS_GLOBAL_CONFIG)?,
        tx.object(input_coin)?,
        tx.pure(&amount_units)?,
        tx.pure(&min_out_units)?,
        tx.pure(&(pool.fee as u128))?,
        tx.pure(&pool.is_reversed)?,
        tx.pure(&recipient)?,
    ];
    tx.move_call(
        &cetus_swap_target(),
        &[pool.token_a.as_str(), pool.token_b.as_str()],
        args,
    )?;
    Ok(tx)
}
