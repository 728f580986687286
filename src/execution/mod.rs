//! Execution payload assembly.
//!
//! Turns caller transactions into meta-transactions and builds the
//! executor-specific payload a proposal is submitted with.

pub mod hash;
pub mod resolver;

pub use hash::{Eip712ExecutionEncoder, ExecutionEncoder, ZodiacNetwork};
pub use resolver::{ExecutorIds, ExecutorKind, ExecutorResolver};

use crate::model::{MetaTransaction, Transaction, META_TRANSACTION_NONCE, OPERATION_CALL};

/// Errors raised while encoding execution data.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// No network entry exists for the executor.
    #[error("no network configured for executor {0}")]
    UnknownNetwork(String),
}

/// Convert transactions into meta-transactions, preserving order and length.
///
/// Every output carries nonce 0 and a plain call operation. Stray `nonce` or
/// `operation` keys among the free-form fields are dropped so they cannot
/// shadow the canonical values on the wire.
pub fn normalize(transactions: &[Transaction]) -> Vec<MetaTransaction> {
    transactions
        .iter()
        .map(|tx| {
            let mut transaction = tx.clone();
            transaction.extra.remove("nonce");
            transaction.extra.remove("operation");
            MetaTransaction {
                transaction,
                nonce: META_TRANSACTION_NONCE,
                operation: OPERATION_CALL,
            }
        })
        .collect()
}
