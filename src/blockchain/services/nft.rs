// src/blockchain/services/nft.rs

use std::str::FromStr;

use anyhow::{anyhow, Result};
use futures::try_join;
use serde::Serialize;
use serde_json::Value;

use crate::amount::{format_base_units_fixed, SUI_DECIMALS};
use crate::blockchain::{
    client::SuiClient,
    models::OwnedObject,
    sui_types::{ObjectId, SUI_COIN_TYPE},
    transaction::TransactionBuilder,
};

// Gas hints shown to the wallet with each marketplace transaction.
pub const MINT_GAS_SUI: f64 = 0.01;
pub const LIST_GAS_SUI: f64 = 0.005;
pub const BUY_GAS_SUI: f64 = 0.01;
pub const KIOSK_GAS_SUI: f64 = 0.001;
pub const PET_GAS_SUI: f64 = 0.01;

const PET_IMAGE_BASE: &str =
    "https://raw.githubusercontent.com/longphu25/bitte-protocol-agent/refs/heads/main/public";

pub fn nft_struct_type(package_id: &str) -> String {
    format!("{package_id}::simple_nft::NFT")
}

/// `simple_nft::mint_and_transfer(name, description, image_url)`
pub fn mint_nft_tx(
    package_id: &str,
    sender: &str,
    name: &str,
    description: &str,
    image_url: &str,
) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    let args = vec![
        tx.pure(&name.as_bytes())?,
        tx.pure(&description.as_bytes())?,
        tx.pure(&image_url.as_bytes())?,
    ];
    tx.move_call(&format!("{package_id}::simple_nft::mint_and_transfer"), &[], args)?;
    Ok(tx)
}

/// `simple_nft::list_nft(&mut Marketplace, NFT, price_mist)`
pub fn list_nft_tx(
    package_id: &str,
    marketplace_id: &str,
    sender: &str,
    nft_id: &str,
    price_mist: u64,
) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    let args = vec![
        tx.object(marketplace_id)?,
        tx.object(nft_id)?,
        tx.pure(&price_mist)?,
    ];
    tx.move_call(&format!("{package_id}::simple_nft::list_nft"), &[], args)?;
    Ok(tx)
}

/// Splits the payment from gas and calls `simple_nft::buy_nft(&mut Marketplace, ID, Coin<SUI>)`.
pub fn buy_nft_tx(
    package_id: &str,
    marketplace_id: &str,
    sender: &str,
    nft_id: &str,
    payment_mist: u64,
) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    let payment = tx.split_coin(tx.gas(), payment_mist)?;
    let nft = ObjectId::from_str(nft_id)?;
    let args = vec![tx.object(marketplace_id)?, tx.pure(&nft)?, payment];
    tx.move_call(&format!("{package_id}::simple_nft::buy_nft"), &[], args)?;
    Ok(tx)
}

pub fn create_kiosk_tx(package_id: &str, sender: &str) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    tx.move_call(
        &format!("{package_id}::marketplace::create_and_share_kiosk"),
        &[],
        Vec::new(),
    )?;
    Ok(tx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Dog,
    Cat,
    Dragon,
}

impl PetType {
    /// Discriminant expected by `pet_nft::mint_pet`.
    pub fn code(&self) -> u8 {
        match self {
            PetType::Dog => 1,
            PetType::Cat => 2,
            PetType::Dragon => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PetType::Dog => "dog",
            PetType::Cat => "cat",
            PetType::Dragon => "dragon",
        }
    }

    pub fn image_url(&self) -> String {
        format!("{PET_IMAGE_BASE}/{}.png", self.as_str())
    }
}

impl FromStr for PetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dog" => Ok(PetType::Dog),
            "cat" => Ok(PetType::Cat),
            "dragon" => Ok(PetType::Dragon),
            other => Err(anyhow!("unknown pet type '{other}'")),
        }
    }
}

pub fn pet_description(pet_type: PetType, name: &str) -> String {
    format!("A {} pet named {}", pet_type.as_str(), name)
}

/// `pet_nft::mint_pet(name, description, pet_type, image_url)`
pub fn mint_pet_tx(package_id: &str, sender: &str, name: &str, pet_type: PetType) -> Result<TransactionBuilder> {
    let mut tx = TransactionBuilder::new(sender)?;
    let description = pet_description(pet_type, name);
    let image_url = pet_type.image_url();
    let args = vec![
        tx.pure(&name.as_bytes())?,
        tx.pure(&description.as_bytes())?,
        tx.pure(&pet_type.code())?,
        tx.pure(&image_url.as_bytes())?,
    ];
    tx.move_call(&format!("{package_id}::pet_nft::mint_pet"), &[], args)?;
    Ok(tx)
}

/// An NFT from the marketplace package, flattened from its Move fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NftSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub creator: String,
    #[serde(rename = "type")]
    pub nft_type: String,
    pub version: u64,
    pub display: Option<Value>,
}

impl NftSummary {
    /// `None` for objects without Move fields.
    pub fn from_object(object: &OwnedObject) -> Option<Self> {
        object.fields.as_ref()?;
        let text = |key: &str, default: &str| object.field_str(key).unwrap_or(default).to_string();
        Some(Self {
            id: object.object_id.clone(),
            name: text("name", "Unknown"),
            description: text("description", ""),
            image_url: text("image_url", ""),
            creator: text("creator", ""),
            nft_type: object.object_type.clone(),
            version: object.version,
            display: object.display.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletSuiBalance {
    pub total_balance: String,
    pub balance_in_sui: String,
    pub coin_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NftWallet {
    pub nfts: Vec<NftSummary>,
    pub nft_count: usize,
    pub sui_balance: WalletSuiBalance,
}

/// Marketplace NFTs held by `owner` and their SUI balance, read concurrently.
pub async fn check_nft_wallet(client: &SuiClient, package_id: &str, owner: &str) -> Result<NftWallet> {
    let nft_type = nft_struct_type(package_id);
    let (objects, balance) = try_join!(
        client.get_owned_objects(owner, Some(nft_type.as_str())),
        client.get_balance(owner, Some(SUI_COIN_TYPE))
    )?;

    let nfts: Vec<NftSummary> = objects.data.iter().filter_map(NftSummary::from_object).collect();
    Ok(NftWallet {
        nft_count: nfts.len(),
        nfts,
        sui_balance: WalletSuiBalance {
            total_balance: balance.total_balance.to_string(),
            balance_in_sui: format_base_units_fixed(balance.total_balance, SUI_DECIMALS, 4),
            coin_count: balance.coin_object_count,
        },
    })
}
