//! Raw representation of the compiler's ABI output.
//!
//! This does no post processing: it keeps the entries exactly as the compiler
//! emitted them, tolerating unknown entry kinds and absent fields, so that the
//! expansion passes can make all the decisions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full compiler output: file identifier to contract name to contract
/// artifacts.
///
/// `BTreeMap` keeps the aggregation pass over all contracts deterministic:
/// the fold visits files and contracts in lexicographic order regardless of
/// the key order of the input JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerOutput {
    /// All compiled contracts, keyed by file identifier then contract name.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

/// The per-contract slice of the compiler output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractOutput {
    /// The contract's ABI.
    #[serde(default)]
    pub abi: RawAbi,
}

/// A contract ABI as a list of entries, each either a function, an event, or
/// something this generator does not bind (constructors, fallbacks, errors).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAbi(pub Vec<AbiEntry>);

impl RawAbi {
    /// Whether the ABI declares no entries at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The declared functions, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.0.iter().filter_map(|entry| match entry {
            AbiEntry::Function(function) => Some(function),
            _ => None,
        })
    }

    /// The declared events, in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &AbiEvent> {
        self.0.iter().filter_map(|entry| match entry {
            AbiEntry::Event(event) => Some(event),
            _ => None,
        })
    }
}

/// One ABI entry, discriminated by its `type` tag.
///
/// Tags other than `function` and `event` are accepted and ignored rather
/// than rejected, since compilers emit constructors, fallbacks and custom
/// errors in the same array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiEntry {
    /// A callable function.
    Function(AbiFunction),
    /// A declared event.
    Event(AbiEvent),
    /// Any other entry kind. Ignored during generation.
    #[serde(other)]
    Other,
}

/// A callable contract function.
///
/// `constant` and `payable` are independent axes: a function may be any of
/// the four combinations of read-only/state-changing and payable/non-payable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbiFunction {
    /// The function name.
    pub name: String,
    /// Input parameters, in declaration order.
    #[serde(default)]
    pub inputs: Vec<AbiParameter>,
    /// Output parameters, in declaration order.
    #[serde(default)]
    pub outputs: Vec<AbiParameter>,
    /// Whether the function is read-only (bound as a local call only).
    #[serde(default)]
    pub constant: bool,
    /// Whether the function accepts an attached value transfer.
    #[serde(default)]
    pub payable: bool,
}

/// A declared contract event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbiEvent {
    /// The event name. Compilers may emit unnamed events; those are skipped.
    #[serde(default)]
    pub name: String,
    /// Event parameters, in declaration order.
    #[serde(default)]
    pub inputs: Vec<AbiEventParameter>,
    /// Whether the event is anonymous (emitted without its topic hash).
    #[serde(default)]
    pub anonymous: bool,
}

/// A function parameter or a nested tuple component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbiParameter {
    /// The parameter name. May be empty.
    #[serde(default)]
    pub name: String,
    /// The raw ABI type descriptor, e.g. `uint256`, `tuple[]`, `bytes32`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Tuple components. Non-empty iff `kind` starts with `tuple`.
    #[serde(default)]
    pub components: Vec<AbiParameter>,
}

/// An event parameter: a plain parameter plus the `indexed` flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbiEventParameter {
    /// The parameter name. May be empty.
    #[serde(default)]
    pub name: String,
    /// The raw ABI type descriptor.
    #[serde(rename = "type")]
    pub kind: String,
    /// Tuple components. Non-empty iff `kind` starts with `tuple`.
    #[serde(default)]
    pub components: Vec<AbiParameter>,
    /// Whether the parameter is stored in the log's topic list rather than
    /// its data payload.
    #[serde(default)]
    pub indexed: bool,
}

impl AbiEventParameter {
    /// The parameter without its event-specific flag, as the codec sees it.
    pub fn as_parameter(&self) -> AbiParameter {
        AbiParameter {
            name: self.name.clone(),
            kind: self.kind.clone(),
            components: self.components.clone(),
        }
    }
}
