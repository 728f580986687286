//! sx-actions - governance action dispatcher
//!
//! Turns high-level governance intents (create a space, propose, vote,
//! finalize, execute on L1) into concrete payloads for a Starknet governance
//! protocol and hands them to pluggable transports.
//!
//! The dispatcher picks the execution strategy for a proposal (Zodiac before
//! Vanilla), computes the Zodiac execution hash, selects a supported
//! authenticator and voting strategies, and submits through the
//! [`transport`] traits.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod execution;
pub mod model;
pub mod registry;
pub mod selection;
pub mod transport;
pub mod utils;

pub use config::Config;
pub use dispatcher::{ActionDispatcher, Transports};
pub use error::{ActionError, Result};
pub use execution::{normalize, EncodingError, ExecutorIds, ExecutorResolver};
pub use model::{
    Choice, CreateSpaceParams, Envelope, ExecutionPayload, MetaTransaction, Proposal, Space,
    Transaction, TxResult,
};
pub use registry::{PrimitiveKind, StaticRegistry, SupportRegistry};
pub use transport::{HttpFinalizeRelayer, RelayerConfig, TransportError};
