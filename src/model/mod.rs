//! Governance data model.
//!
//! Spaces and proposals are read-only inputs. Everything derived from them
//! (meta-transactions, execution payloads, selections, transport payloads) is
//! built fresh for each action and owned by it.

use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A governance space and the on-chain primitives it is configured with.
///
/// The id lists are operator-controlled and may contain nothing this crate
/// knows how to drive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Space {
    pub id: String,
    pub executors: Vec<String>,
    pub authenticators: Vec<String>,
    /// Voting strategy ids. Index `i` pairs with the strategy parameters at
    /// index `i` of the on-chain configuration.
    pub strategies: Vec<String>,
}

impl Space {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_executors<I, S>(mut self, executors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.executors = executors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_authenticators<I, S>(mut self, authenticators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authenticators = authenticators.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strategies<I, S>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategies = strategies.into_iter().map(Into::into).collect();
        self
    }
}

/// A proposal within a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub space: Space,
    pub proposal_id: u64,
    /// Strategy ids as they were when the proposal was created. Votes are
    /// weighed against this list, not the space's current one.
    pub strategies: Vec<String>,
    /// Transactions to run once the proposal passes.
    #[serde(default)]
    pub execution: Vec<Transaction>,
}

impl Proposal {
    /// Create a proposal that snapshots the space's current strategies.
    pub fn new(space: Space, proposal_id: u64) -> Self {
        let strategies = space.strategies.clone();
        Self {
            space,
            proposal_id,
            strategies,
            execution: Vec::new(),
        }
    }

    pub fn with_execution(mut self, execution: Vec<Transaction>) -> Self {
        self.execution = execution;
        self
    }
}

/// A call proposed for execution, as supplied by the caller.
///
/// `to`, `value` and `data` are typed because the execution hash needs them.
/// Any other fields are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Transaction {
    pub fn new(to: Address, value: U256, data: Bytes) -> Self {
        Self {
            to,
            value,
            data,
            extra: BTreeMap::new(),
        }
    }
}

/// Operation kind of a meta-transaction. Only plain calls are ever emitted.
pub const OPERATION_CALL: u8 = 0;

/// Nonce attached to every meta-transaction.
pub const META_TRANSACTION_NONCE: u64 = 0;

/// A transaction in the canonical shape the executors hash and run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub nonce: u64,
    pub operation: u8,
}

/// Executor-specific execution data for a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPayload {
    /// No-op executor. Carries no execution data.
    Vanilla { executor: String },
    /// Module executor. Carries the encoded execution hash.
    Zodiac {
        executor: String,
        execution_params: Vec<String>,
    },
}

impl ExecutionPayload {
    pub fn executor(&self) -> &str {
        match self {
            ExecutionPayload::Vanilla { executor } | ExecutionPayload::Zodiac { executor, .. } => {
                executor
            }
        }
    }

    pub fn execution_params(&self) -> &[String] {
        match self {
            ExecutionPayload::Vanilla { .. } => &[],
            ExecutionPayload::Zodiac {
                execution_params, ..
            } => execution_params,
        }
    }

    pub fn is_zodiac(&self) -> bool {
        matches!(self, ExecutionPayload::Zodiac { .. })
    }
}

/// The authenticator and strategies an action will be submitted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub authenticator: String,
    /// Positions in the source strategy list, ascending.
    pub strategies: Vec<usize>,
}

/// A vote choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    Against,
    For,
    Abstain,
}

impl Choice {
    pub fn as_u8(self) -> u8 {
        match self {
            Choice::Against => 0,
            Choice::For => 1,
            Choice::Abstain => 2,
        }
    }
}

impl TryFrom<u8> for Choice {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Choice::Against),
            1 => Ok(Choice::For),
            2 => Ok(Choice::Abstain),
            other => Err(other),
        }
    }
}

/// Parameters for deploying a new space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceParams {
    pub controller: String,
    pub voting_delay: u64,
    pub min_voting_duration: u64,
    pub max_voting_duration: u64,
    pub proposal_threshold: U256,
    pub quorum: U256,
    pub authenticators: Vec<String>,
    pub voting_strategies: Vec<String>,
    pub voting_strategies_params: Vec<Vec<String>>,
    pub execution_strategies: Vec<String>,
    pub metadata_uri: String,
}

/// Proposal submission handed to the proposal transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposePayload {
    pub space: String,
    pub authenticator: String,
    pub strategies: Vec<usize>,
    pub metadata_uri: String,
    pub executor: String,
    pub execution_params: Vec<String>,
}

/// Vote submission handed to the proposal transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub space: String,
    pub authenticator: String,
    pub strategies: Vec<usize>,
    pub proposal: u64,
    pub choice: u8,
}

/// Transactions handed to a module executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleTransactions {
    pub transactions: Vec<MetaTransaction>,
}

/// Body of a relayer finalize request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeRequest {
    pub transactions: Vec<MetaTransaction>,
}

/// Relayer finalize response. Any `error` value is fatal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FinalizeResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub receipt: Option<serde_json::Value>,
}

/// A pre-signed message forwarded to the transport without inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(serde_json::Value);

impl Envelope {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Result of a submitted transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResult {
    #[serde(default)]
    pub transaction_hash: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TxResult {
    pub fn new(transaction_hash: impl Into<String>) -> Self {
        Self {
            transaction_hash: transaction_hash.into(),
            extra: serde_json::Map::new(),
        }
    }
}
