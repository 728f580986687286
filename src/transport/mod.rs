//! Transport collaborators.
//!
//! The dispatcher never talks to a wallet, chain or relayer directly. Each
//! outbound concern is a trait here, so deployments plug in their signing
//! clients and tests plug in recording mocks.
//!
//! | Trait | Used by |
//! |-------|---------|
//! | [`NetworkVerifier`] | every wallet-signed action except space management |
//! | [`SpaceManager`] | `create_space`, `set_metadata_uri` |
//! | [`ProposalTransport`] | `propose`, `vote`, `send` |
//! | [`ModuleExecutor`] | `receive_proposal`, `execute_transactions` |
//! | [`FinalizeRelayer`] | `finalize_proposal` |
//!
//! All traits are generic over the wallet handle `W` the caller signs with.

pub mod relayer;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use relayer::{HttpFinalizeRelayer, RelayerConfig};

use async_trait::async_trait;

use crate::model::{
    CreateSpaceParams, Envelope, FinalizeRequest, FinalizeResponse, MetaTransaction,
    ModuleTransactions, ProposePayload, TxResult, VotePayload,
};

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors reported by transports.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The chain or signer refused the submission.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Could not reach the backend.
    #[error("connection failed: {0}")]
    Connection(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload or response could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend is not configured or temporarily unavailable.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Errors from wallet network verification.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("wallet is on chain {actual:?}, expected {expected}")]
    WrongNetwork { expected: u64, actual: Option<u64> },

    #[error("network verification unavailable: {0}")]
    Unavailable(String),
}

impl From<NetworkError> for crate::error::ActionError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::WrongNetwork { expected, actual } => {
                crate::error::ActionError::WrongNetwork { expected, actual }
            }
            NetworkError::Unavailable(message) => TransportError::Unavailable(message).into(),
        }
    }
}

/// Confirms the wallet is connected to the expected L1 chain.
#[async_trait]
pub trait NetworkVerifier<W>: Send + Sync {
    async fn verify_network(
        &self,
        wallet: &W,
        expected_chain_id: u64,
    ) -> std::result::Result<(), NetworkError>;
}

/// Deploys spaces and updates their metadata.
#[async_trait]
pub trait SpaceManager<W>: Send + Sync {
    async fn deploy_space(&self, wallet: &W, params: CreateSpaceParams) -> Result<TxResult>;

    async fn set_metadata_uri(
        &self,
        wallet: &W,
        space_id: &str,
        metadata_uri: &str,
    ) -> Result<TxResult>;
}

/// Signs and submits proposals and votes.
#[async_trait]
pub trait ProposalTransport<W>: Send + Sync {
    async fn propose(&self, wallet: &W, account: &str, payload: ProposePayload)
        -> Result<TxResult>;

    async fn vote(&self, wallet: &W, account: &str, payload: VotePayload) -> Result<TxResult>;

    /// Forward an already-signed envelope.
    async fn send(&self, envelope: Envelope) -> Result<TxResult>;
}

/// L1 module executor (Zodiac-class).
#[async_trait]
pub trait ModuleExecutor<W>: Send + Sync {
    async fn receive_proposal(
        &self,
        wallet: &W,
        space_id: &str,
        executor: &str,
        transactions: ModuleTransactions,
    ) -> Result<TxResult>;

    async fn execute_proposal_tx_batch(
        &self,
        wallet: &W,
        proposal_index: u64,
        executor: &str,
        transactions: Vec<MetaTransaction>,
    ) -> Result<TxResult>;
}

/// Relayer service that finalizes proposals.
#[async_trait]
pub trait FinalizeRelayer: Send + Sync {
    async fn finalize(
        &self,
        space_id: &str,
        proposal_id: u64,
        request: FinalizeRequest,
    ) -> Result<FinalizeResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;

    #[test]
    fn test_wrong_network_maps_to_action_error() {
        let err: ActionError = NetworkError::WrongNetwork {
            expected: 5,
            actual: Some(1),
        }
        .into();
        assert!(matches!(
            err,
            ActionError::WrongNetwork {
                expected: 5,
                actual: Some(1)
            }
        ));
    }

    #[test]
    fn test_unavailable_maps_to_transport() {
        let err: ActionError = NetworkError::Unavailable("provider offline".to_string()).into();
        assert!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "transport error: unavailable: provider offline"
        );
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "connection failed: refused");
    }
}
