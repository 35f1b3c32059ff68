//! Programmable transaction builder.
//!
//! Commands are collected against unresolved inputs; `build` resolves object
//! references, prices gas with a dry run, selects gas coins and returns the
//! BCS encoding of `TransactionData::V1` ready for a wallet to sign.

use std::collections::HashSet;

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64STD;
use base64::Engine;
use serde::Serialize;
use tracing::debug;

use crate::blockchain::{
    client::SuiClient,
    models::{GasCostSummary, SuiObjectData},
    sui_types::{ObjectId, SuiAddress, TypeTag, SUI_COIN_TYPE},
};

/// Upper bound on gas coins a transaction may reference.
pub const MAX_GAS_OBJECTS: usize = 256;
/// Extra gas units budgeted on top of the dry run's computation cost.
const GAS_SAFE_OVERHEAD: u64 = 1000;

// --- BCS layout (only the variants this crate emits, in on-chain order) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDigest(pub Vec<u8>);

pub type ObjectRef = (ObjectId, u64, ObjectDigest);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallArg {
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects(Vec<Argument>, Argument),
    SplitCoins(Argument, Vec<Argument>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionExpiration {
    None,
    Epoch(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

impl TransactionData {
    pub fn to_bcs(&self) -> Result<Vec<u8>> {
        bcs::to_bytes(self).context("failed to BCS-encode transaction")
    }
}

/// Decodes a base58 object digest as returned by the fullnode.
pub fn parse_digest(digest: &str) -> Result<ObjectDigest> {
    let bytes = bs58::decode(digest)
        .into_vec()
        .with_context(|| format!("invalid object digest '{digest}'"))?;
    if bytes.len() != 32 {
        bail!("object digest '{}' is {} bytes, expected 32", digest, bytes.len());
    }
    Ok(ObjectDigest(bytes))
}

/// Turns a fetched object into the call argument that references it.
/// Shared objects are always passed mutably.
pub fn object_arg(data: &SuiObjectData) -> Result<ObjectArg> {
    let id: ObjectId = data.object_id.parse()?;
    let shared_version = data
        .owner
        .as_ref()
        .and_then(|owner| owner.get("Shared"))
        .and_then(|shared| shared.get("initial_shared_version"))
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())));

    Ok(match shared_version {
        Some(initial_shared_version) => ObjectArg::SharedObject {
            id,
            initial_shared_version,
            mutable: true,
        },
        None => ObjectArg::ImmOrOwnedObject((id, data.version, parse_digest(&data.digest)?)),
    })
}

/// Gas budget from dry-run costs: computation plus a safety overhead, and
/// the net storage charge when it is positive.
pub fn budget_from_dry_run(gas_used: &GasCostSummary, gas_price: u64) -> u64 {
    let overhead = GAS_SAFE_OVERHEAD.saturating_mul(gas_price);
    let base = gas_used.computation_cost.saturating_add(overhead);
    let with_storage = base
        .saturating_add(gas_used.storage_cost)
        .saturating_sub(gas_used.storage_rebate);
    base.max(with_storage)
}

#[derive(Debug, Clone)]
enum UnresolvedInput {
    Pure(Vec<u8>),
    Object(String),
}

/// Collects inputs and commands for one sender.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender: SuiAddress,
    inputs: Vec<UnresolvedInput>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new(sender: &str) -> Result<Self> {
        Ok(Self {
            sender: sender.parse()?,
            inputs: Vec::new(),
            commands: Vec::new(),
        })
    }

    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    fn push_input(&mut self, input: UnresolvedInput) -> Result<Argument> {
        let index = u16::try_from(self.inputs.len()).context("too many transaction inputs")?;
        self.inputs.push(input);
        Ok(Argument::Input(index))
    }

    /// A BCS-encoded pure value (`u64`, `bool`, `Vec<u8>`, `SuiAddress`, ...).
    pub fn pure<T: Serialize>(&mut self, value: &T) -> Result<Argument> {
        let bytes = bcs::to_bytes(value).context("failed to encode pure argument")?;
        self.push_input(UnresolvedInput::Pure(bytes))
    }

    /// An object input; the same object id always maps to the same input.
    pub fn object(&mut self, object_id: &str) -> Result<Argument> {
        let normalized = object_id.parse::<ObjectId>()?.to_hex_literal();
        let existing = self.inputs.iter().position(
            |input| matches!(input, UnresolvedInput::Object(id) if *id == normalized),
        );
        match existing {
            Some(index) => Ok(Argument::Input(index as u16)),
            None => self.push_input(UnresolvedInput::Object(normalized)),
        }
    }

    fn push_command(&mut self, command: Command) -> Result<u16> {
        let index = u16::try_from(self.commands.len()).context("too many commands")?;
        self.commands.push(command);
        Ok(index)
    }

    /// Calls `package::module::function` and returns its result.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: &[&str],
        arguments: Vec<Argument>,
    ) -> Result<Argument> {
        let mut parts = target.split("::");
        let (package, module, function) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(m), Some(f), None) => (p, m, f),
            _ => bail!("move call target '{target}' is not package::module::function"),
        };
        let type_arguments = type_arguments
            .iter()
            .map(|t| t.parse::<TypeTag>())
            .collect::<Result<Vec<_>, _>>()?;

        let index = self.push_command(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: package.parse()?,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        })))?;
        Ok(Argument::Result(index))
    }

    /// Splits a single coin of `amount` off `coin` and returns it.
    pub fn split_coin(&mut self, coin: Argument, amount: u64) -> Result<Argument> {
        let amount = self.pure(&amount)?;
        let index = self.push_command(Command::SplitCoins(coin, vec![amount]))?;
        Ok(Argument::NestedResult(index, 0))
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: &str) -> Result<()> {
        let recipient: SuiAddress = recipient.parse()?;
        let recipient = self.pure(&recipient)?;
        self.push_command(Command::TransferObjects(objects, recipient))?;
        Ok(())
    }

    fn object_ids(&self) -> Vec<String> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                UnresolvedInput::Object(id) => Some(id.clone()),
                UnresolvedInput::Pure(_) => None,
            })
            .collect()
    }

    async fn resolve_inputs(&self, client: &SuiClient) -> Result<Vec<CallArg>> {
        let ids = self.object_ids();
        let mut resolved = Vec::with_capacity(ids.len());
        if !ids.is_empty() {
            for (id, response) in ids.iter().zip(client.multi_get_objects(&ids).await?) {
                let data = response.data.ok_or_else(|| {
                    anyhow!(
                        "object {} could not be fetched: {}",
                        id,
                        response.error.map(|e| e.to_string()).unwrap_or_default()
                    )
                })?;
                resolved.push(object_arg(&data)?);
            }
        }
        if resolved.len() != ids.len() {
            bail!("fullnode returned {} of {} requested objects", resolved.len(), ids.len());
        }

        let mut objects = resolved.into_iter();
        self.inputs
            .iter()
            .map(|input| match input {
                UnresolvedInput::Pure(bytes) => Ok(CallArg::Pure(bytes.clone())),
                UnresolvedInput::Object(id) => objects
                    .next()
                    .map(CallArg::Object)
                    .ok_or_else(|| anyhow!("object {id} was not resolved")),
            })
            .collect()
    }

    fn transaction_data(
        &self,
        inputs: Vec<CallArg>,
        payment: Vec<ObjectRef>,
        price: u64,
        budget: u64,
    ) -> TransactionData {
        TransactionData::V1(TransactionDataV1 {
            kind: TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
                inputs,
                commands: self.commands.clone(),
            }),
            sender: self.sender,
            gas_data: GasData {
                payment,
                owner: self.sender,
                price,
                budget,
            },
            expiration: TransactionExpiration::None,
        })
    }

    async fn select_gas_coins(&self, client: &SuiClient) -> Result<Vec<ObjectRef>> {
        let used: HashSet<String> = self.object_ids().into_iter().collect();
        let owner = self.sender.to_hex_literal();
        let coins = client.get_coins(&owner, SUI_COIN_TYPE).await?;

        let mut payment = Vec::new();
        for coin in coins.data {
            let id: ObjectId = coin.coin_object_id.parse()?;
            if used.contains(&id.to_hex_literal()) {
                continue;
            }
            payment.push((id, coin.version, parse_digest(&coin.digest)?));
            if payment.len() == MAX_GAS_OBJECTS {
                break;
            }
        }
        if payment.is_empty() {
            bail!("No valid gas coins found for the transaction.");
        }
        Ok(payment)
    }

    /// Resolves, prices and encodes the transaction. Returns the BCS bytes.
    pub async fn build(&self, client: &SuiClient, max_gas_budget: u64) -> Result<Vec<u8>> {
        let inputs = self.resolve_inputs(client).await?;
        let price = client.get_reference_gas_price().await?;

        let unpaid = self.transaction_data(inputs.clone(), Vec::new(), price, max_gas_budget);
        let dry_run = client.dry_run(&BASE64STD.encode(unpaid.to_bcs()?)).await?;
        if dry_run.effects.status.status != "success" {
            bail!(
                "Dry run failed, could not automatically determine a budget: {}",
                dry_run.effects.status.error.unwrap_or_default()
            );
        }
        let budget = budget_from_dry_run(&dry_run.effects.gas_used, price);
        debug!("Dry run ok, gas price {} budget {}", price, budget);

        let payment = self.select_gas_coins(client).await?;
        self.transaction_data(inputs, payment, price, budget).to_bcs()
    }

    /// Same as [`build`](Self::build), base64 encoded for a sign request.
    pub async fn build_base64(&self, client: &SuiClient, max_gas_budget: u64) -> Result<String> {
        Ok(BASE64STD.encode(self.build(client, max_gas_budget).await?))
    }
}
