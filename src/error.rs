//! Error types for governance actions.

use crate::execution::EncodingError;
use crate::transport::TransportError;

/// Result type for dispatcher operations.
pub type Result<T> = std::result::Result<T, ActionError>;

/// Errors that can occur while dispatching a governance action.
///
/// Every variant is fatal to the action that raised it. Nothing is submitted
/// once an error has been returned.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The space has no usable executor, or no usable authenticator and
    /// strategy combination.
    #[error("unsupported space: {0}")]
    UnsupportedSpace(String),

    /// The wallet is connected to a different chain.
    #[error("wrong network: expected chain {expected}, wallet is on {}", display_chain(.actual))]
    WrongNetwork { expected: u64, actual: Option<u64> },

    /// The relayer refused or failed to finalize the proposal.
    #[error("finalization failed: {0}")]
    Finalization(String),

    /// The execution payload could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Failure reported by an underlying transport, passed through unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

fn display_chain(actual: &Option<u64>) -> String {
    match actual {
        Some(id) => id.to_string(),
        None => "an unknown chain".to_string(),
    }
}

impl ActionError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        ActionError::UnsupportedSpace(reason.into())
    }

    /// Returns true if the space configuration cannot be acted on.
    pub fn is_unsupported_space(&self) -> bool {
        matches!(self, ActionError::UnsupportedSpace(_))
    }

    /// Returns true if the wallet is on the wrong chain.
    pub fn is_wrong_network(&self) -> bool {
        matches!(self, ActionError::WrongNetwork { .. })
    }

    /// Returns true if the failure came from a transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, ActionError::Transport(_))
    }
}
