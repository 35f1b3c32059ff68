//! Request validation helpers shared by the tool handlers.

use crate::amount::{DecimalAmount, Rounding};
use crate::api::params::ToolParams;
use crate::api::response::{ErrorBody, ToolError};
use crate::blockchain::{models::Network, sui_types::SuiAddress};

/// Helper function to extract a required, non-empty parameter.
pub fn require(params: &ToolParams, key: &str, label: &'static str) -> Result<String, ToolError> {
    params.str(key).ok_or(ToolError::MissingParameter(label))
}

/// The requested network, or `default` when the parameter is absent.
pub fn network(params: &ToolParams, default: Network) -> Result<Network, ToolError> {
    match params.str("network") {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ToolError::InvalidNetwork(raw)),
    }
}

/// Parses a strictly positive decimal amount; `message` is the 400 error text.
pub fn positive_amount(raw: &str, message: &str) -> Result<DecimalAmount, ToolError> {
    match raw.parse::<DecimalAmount>() {
        Ok(amount) if !amount.is_zero() => Ok(amount),
        Ok(_) => Err(ToolError::bad_request(message)),
        Err(e) => Err(ToolError::BadRequest(
            ErrorBody::new(message).details(e.to_string()),
        )),
    }
}

/// Base units of a positive amount. Amounts that round down to zero units
/// are rejected with the same `message`.
pub fn base_units(
    amount: &DecimalAmount,
    decimals: u32,
    rounding: Rounding,
    message: &str,
) -> Result<u128, ToolError> {
    match amount.to_base_units(decimals, rounding) {
        Ok(0) => Err(ToolError::BadRequest(
            ErrorBody::new(message).details(format!(
                "{amount} is smaller than the smallest unit (10^-{decimals})"
            )),
        )),
        Ok(units) => Ok(units),
        Err(e) => Err(ToolError::BadRequest(
            ErrorBody::new(message).details(e.to_string()),
        )),
    }
}

/// Superficial Sui address check: `0x` prefix and at least 10 characters.
pub fn sui_address(value: &str, label: &str) -> Result<(), ToolError> {
    if value.starts_with("0x") && value.len() >= 10 {
        Ok(())
    } else {
        Err(ToolError::bad_request(format!(
            "Invalid {label} format. Must be a valid Sui address starting with 0x"
        )))
    }
}

/// Address that will be encoded into a transaction: the superficial check
/// plus valid hex of at most 32 bytes.
pub fn buildable_sui_address(value: &str, label: &str) -> Result<SuiAddress, ToolError> {
    sui_address(value, label)?;
    value.parse::<SuiAddress>().map_err(|e| {
        ToolError::BadRequest(
            ErrorBody::new(format!(
                "Invalid {label} format. Must be a valid Sui address starting with 0x"
            ))
            .details(e.to_string()),
        )
    })
}

/// A configured value, or the 500 naming the missing variable.
pub fn require_config<'a>(
    value: &'a Option<String>,
    variable: &'static str,
) -> Result<&'a str, ToolError> {
    value.as_deref().ok_or(ToolError::MissingConfig(variable))
}
