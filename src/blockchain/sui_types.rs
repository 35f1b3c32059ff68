//! Sui addresses and Move type tags in their BCS layout.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub const SUI_ADDRESS_LENGTH: usize = 32;
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SuiTypeError {
    #[error("'{0}' is not a valid Sui address: expected up to 64 hex digits")]
    InvalidAddress(String),
    #[error("'{0}' is not a valid Move type: {1}")]
    InvalidType(String, &'static str),
}

/// A 32-byte account address or object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SuiAddress(pub [u8; SUI_ADDRESS_LENGTH]);

pub type ObjectId = SuiAddress;

impl SuiAddress {
    pub const ZERO: SuiAddress = SuiAddress([0; SUI_ADDRESS_LENGTH]);

    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for SuiAddress {
    type Err = SuiTypeError;

    /// Accepts `0x`-prefixed or bare hex; short forms such as `0x2` are left padded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SuiTypeError::InvalidAddress(s.to_string());
        let digits = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        if digits.is_empty() || digits.len() > SUI_ADDRESS_LENGTH * 2 {
            return Err(invalid());
        }
        let padded = format!("{:0>width$}", digits, width = SUI_ADDRESS_LENGTH * 2);
        let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
        hex::decode_to_slice(padded, &mut bytes).map_err(|_| invalid())?;
        Ok(SuiAddress(bytes))
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

/// Move type tag. Variant order is the on-chain BCS tag order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructTag {
    pub address: SuiAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl FromStr for TypeTag {
    type Err = SuiTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, rest) = parse_type(s, s)?;
        if !rest.trim().is_empty() {
            return Err(SuiTypeError::InvalidType(s.to_string(), "trailing characters"));
        }
        Ok(tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::U256 => f.write_str("u256"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => {
                write!(f, "{}::{}::{}", tag.address, tag.module, tag.name)?;
                if !tag.type_params.is_empty() {
                    let params: Vec<String> =
                        tag.type_params.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", params.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses one type from the front of `input`, returning the unparsed rest.
fn parse_type<'a>(input: &'a str, whole: &str) -> Result<(TypeTag, &'a str), SuiTypeError> {
    let invalid = |why| SuiTypeError::InvalidType(whole.to_string(), why);

    let input = input.trim_start();
    let end = input.find(['<', '>', ',']).unwrap_or(input.len());
    let head = input[..end].trim();
    let rest = &input[end..];

    let primitive = match head {
        "bool" => Some(TypeTag::Bool),
        "u8" => Some(TypeTag::U8),
        "u16" => Some(TypeTag::U16),
        "u32" => Some(TypeTag::U32),
        "u64" => Some(TypeTag::U64),
        "u128" => Some(TypeTag::U128),
        "u256" => Some(TypeTag::U256),
        "address" => Some(TypeTag::Address),
        "signer" => Some(TypeTag::Signer),
        _ => None,
    };
    if let Some(tag) = primitive {
        return Ok((tag, rest));
    }

    if head == "vector" {
        let rest = rest.strip_prefix('<').ok_or_else(|| invalid("vector needs a type parameter"))?;
        let (inner, rest) = parse_type(rest, whole)?;
        let rest = rest
            .trim_start()
            .strip_prefix('>')
            .ok_or_else(|| invalid("unclosed vector"))?;
        return Ok((TypeTag::Vector(Box::new(inner)), rest));
    }

    let mut parts = head.split("::");
    let (address, module, name) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(m), Some(n), None) => (a, m, n),
        _ => return Err(invalid("expected address::module::name")),
    };
    if !is_identifier(module) || !is_identifier(name) {
        return Err(invalid("bad module or struct name"));
    }
    let address: SuiAddress = address.parse().map_err(|_| invalid("bad address"))?;

    let mut type_params = Vec::new();
    let mut rest = rest;
    if let Some(mut inner) = rest.strip_prefix('<') {
        loop {
            let (param, after) = parse_type(inner, whole)?;
            type_params.push(param);
            let after = after.trim_start();
            if let Some(next) = after.strip_prefix(',') {
                inner = next;
            } else if let Some(next) = after.strip_prefix('>') {
                rest = next;
                break;
            } else {
                return Err(invalid("unclosed type parameter list"));
            }
        }
    }

    Ok((
        TypeTag::Struct(Box::new(StructTag {
            address,
            module: module.to_string(),
            name: name.to_string(),
            type_params,
        })),
        rest,
    ))
}
