//! Recording mock backend for tests.
//!
//! [`MockChain`] implements every transport trait plus [`ExecutionEncoder`]
//! and writes each call to a shared journal, so tests can assert what was
//! called and in which order.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use super::{
    FinalizeRelayer, ModuleExecutor, NetworkError, NetworkVerifier, ProposalTransport, Result,
    SpaceManager, TransportError,
};
use crate::execution::{EncodingError, ExecutionEncoder};
use crate::model::{
    CreateSpaceParams, Envelope, FinalizeRequest, FinalizeResponse, MetaTransaction,
    ModuleTransactions, ProposePayload, TxResult, VotePayload,
};

/// Wallet handle used with [`MockChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockWallet {
    pub chain_id: u64,
}

impl MockWallet {
    pub fn on_chain(chain_id: u64) -> Self {
        Self { chain_id }
    }
}

/// A call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    VerifyNetwork { expected: u64 },
    Encode { executor: String, count: usize },
    DeploySpace(CreateSpaceParams),
    SetMetadataUri { space_id: String, metadata_uri: String },
    Propose { account: String, payload: ProposePayload },
    Vote { account: String, payload: VotePayload },
    Send(Envelope),
    ReceiveProposal {
        space_id: String,
        executor: String,
        transactions: Vec<MetaTransaction>,
    },
    ExecuteTxBatch {
        proposal_index: u64,
        executor: String,
        transactions: Vec<MetaTransaction>,
    },
    Finalize {
        space_id: String,
        proposal_id: u64,
        transactions: Vec<MetaTransaction>,
    },
}

impl Call {
    /// Short name for order assertions.
    pub fn name(&self) -> &'static str {
        match self {
            Call::VerifyNetwork { .. } => "verify_network",
            Call::Encode { .. } => "encode",
            Call::DeploySpace(_) => "deploy_space",
            Call::SetMetadataUri { .. } => "set_metadata_uri",
            Call::Propose { .. } => "propose",
            Call::Vote { .. } => "vote",
            Call::Send(_) => "send",
            Call::ReceiveProposal { .. } => "receive_proposal",
            Call::ExecuteTxBatch { .. } => "execute_proposal_tx_batch",
            Call::Finalize { .. } => "finalize",
        }
    }
}

/// Canned relayer reply.
#[derive(Debug, Clone)]
pub enum RelayerReply {
    Response(serde_json::Value),
    Unreachable(String),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    reject_with: Option<String>,
    relayer_reply: Option<RelayerReply>,
}

/// In-memory chain, wallet and relayer.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<State>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every submitting call fail with [`TransportError::Rejected`].
    pub fn reject_with(&self, reason: impl Into<String>) {
        self.lock().reject_with = Some(reason.into());
    }

    /// Set the reply returned by the relayer.
    pub fn set_relayer_reply(&self, reply: RelayerReply) {
        self.lock().relayer_reply = Some(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.lock().calls.iter().map(Call::name).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("mock state poisoned")
    }

    fn record(&self, call: Call) -> Result<TxResult> {
        let mut state = self.lock();
        let index = state.calls.len();
        state.calls.push(call);
        match &state.reject_with {
            Some(reason) => Err(TransportError::Rejected(reason.clone())),
            None => Ok(TxResult::new(format!("0x{index:064x}"))),
        }
    }
}

#[async_trait]
impl NetworkVerifier<MockWallet> for MockChain {
    async fn verify_network(
        &self,
        wallet: &MockWallet,
        expected_chain_id: u64,
    ) -> std::result::Result<(), NetworkError> {
        self.lock().calls.push(Call::VerifyNetwork {
            expected: expected_chain_id,
        });
        if wallet.chain_id == expected_chain_id {
            Ok(())
        } else {
            Err(NetworkError::WrongNetwork {
                expected: expected_chain_id,
                actual: Some(wallet.chain_id),
            })
        }
    }
}

impl ExecutionEncoder for MockChain {
    fn encode(
        &self,
        executor: &str,
        transactions: &[MetaTransaction],
    ) -> std::result::Result<Vec<String>, EncodingError> {
        self.lock().calls.push(Call::Encode {
            executor: executor.to_string(),
            count: transactions.len(),
        });
        Ok(vec![
            format!("{:#x}", transactions.len()),
            "0x0".to_string(),
        ])
    }
}

#[async_trait]
impl SpaceManager<MockWallet> for MockChain {
    async fn deploy_space(
        &self,
        _wallet: &MockWallet,
        params: CreateSpaceParams,
    ) -> Result<TxResult> {
        self.record(Call::DeploySpace(params))
    }

    async fn set_metadata_uri(
        &self,
        _wallet: &MockWallet,
        space_id: &str,
        metadata_uri: &str,
    ) -> Result<TxResult> {
        self.record(Call::SetMetadataUri {
            space_id: space_id.to_string(),
            metadata_uri: metadata_uri.to_string(),
        })
    }
}

#[async_trait]
impl ProposalTransport<MockWallet> for MockChain {
    async fn propose(
        &self,
        _wallet: &MockWallet,
        account: &str,
        payload: ProposePayload,
    ) -> Result<TxResult> {
        self.record(Call::Propose {
            account: account.to_string(),
            payload,
        })
    }

    async fn vote(
        &self,
        _wallet: &MockWallet,
        account: &str,
        payload: VotePayload,
    ) -> Result<TxResult> {
        self.record(Call::Vote {
            account: account.to_string(),
            payload,
        })
    }

    async fn send(&self, envelope: Envelope) -> Result<TxResult> {
        self.record(Call::Send(envelope))
    }
}

#[async_trait]
impl ModuleExecutor<MockWallet> for MockChain {
    async fn receive_proposal(
        &self,
        _wallet: &MockWallet,
        space_id: &str,
        executor: &str,
        transactions: ModuleTransactions,
    ) -> Result<TxResult> {
        self.record(Call::ReceiveProposal {
            space_id: space_id.to_string(),
            executor: executor.to_string(),
            transactions: transactions.transactions,
        })
    }

    async fn execute_proposal_tx_batch(
        &self,
        _wallet: &MockWallet,
        proposal_index: u64,
        executor: &str,
        transactions: Vec<MetaTransaction>,
    ) -> Result<TxResult> {
        self.record(Call::ExecuteTxBatch {
            proposal_index,
            executor: executor.to_string(),
            transactions,
        })
    }
}

#[async_trait]
impl FinalizeRelayer for MockChain {
    async fn finalize(
        &self,
        space_id: &str,
        proposal_id: u64,
        request: FinalizeRequest,
    ) -> Result<FinalizeResponse> {
        let mut state = self.lock();
        state.calls.push(Call::Finalize {
            space_id: space_id.to_string(),
            proposal_id,
            transactions: request.transactions,
        });

        let reply = state
            .relayer_reply
            .clone()
            .unwrap_or_else(|| RelayerReply::Response(json!({ "receipt": {} })));
        match reply {
            RelayerReply::Response(value) => Ok(serde_json::from_value(value)?),
            RelayerReply::Unreachable(reason) => Err(TransportError::Connection(reason)),
        }
    }
}
