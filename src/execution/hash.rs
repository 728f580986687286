//! Zodiac execution hash encoding.
//!
//! The Zodiac module executor is handed a single execution hash committing to
//! the proposal's transactions. Each meta-transaction is hashed as an EIP-712
//! `Transaction` struct under the module's domain, the list of digests is
//! ABI-encoded as `bytes32[]` and hashed again, and the result is split into
//! two 128-bit halves so it fits Starknet felts.

use std::collections::HashMap;

use alloy_primitives::{keccak256, Address, B256, U256};
use serde::Deserialize;

use super::EncodingError;
use crate::model::MetaTransaction;

const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";
const TRANSACTION_TYPE: &str =
    "Transaction(address to,uint256 value,bytes data,uint8 operation,uint256 nonce)";

/// Builds the execution parameters for an executor.
///
/// Implementations are looked up by executor id so that each deployment can
/// carry its own network parameters.
pub trait ExecutionEncoder: Send + Sync {
    fn encode(
        &self,
        executor: &str,
        transactions: &[MetaTransaction],
    ) -> Result<Vec<String>, EncodingError>;
}

/// L1 deployment of a Zodiac module, keyed by its Starknet executor id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZodiacNetwork {
    pub executor: String,
    pub module_address: Address,
    pub chain_id: u64,
}

/// EIP-712 execution hash encoder.
#[derive(Debug, Clone, Default)]
pub struct Eip712ExecutionEncoder {
    networks: HashMap<String, ZodiacNetwork>,
}

impl Eip712ExecutionEncoder {
    pub fn new(networks: impl IntoIterator<Item = ZodiacNetwork>) -> Self {
        Self {
            networks: networks
                .into_iter()
                .map(|network| (network.executor.clone(), network))
                .collect(),
        }
    }

    pub fn with_network(mut self, network: ZodiacNetwork) -> Self {
        self.networks.insert(network.executor.clone(), network);
        self
    }

    /// Hash of the transaction list under the given module domain.
    pub fn execution_hash(network: &ZodiacNetwork, transactions: &[MetaTransaction]) -> B256 {
        let domain = domain_separator(network);

        let mut encoded = Vec::with_capacity(64 + transactions.len() * 32);
        encoded.extend_from_slice(&U256::from(32).to_be_bytes::<32>());
        encoded.extend_from_slice(&U256::from(transactions.len()).to_be_bytes::<32>());
        for tx in transactions {
            encoded.extend_from_slice(transaction_digest(&domain, tx).as_slice());
        }

        keccak256(encoded)
    }
}

impl ExecutionEncoder for Eip712ExecutionEncoder {
    fn encode(
        &self,
        executor: &str,
        transactions: &[MetaTransaction],
    ) -> Result<Vec<String>, EncodingError> {
        let network = self
            .networks
            .get(executor)
            .ok_or_else(|| EncodingError::UnknownNetwork(executor.to_string()))?;

        let (low, high) = split_u256(Self::execution_hash(network, transactions));
        Ok(vec![format!("{low:#x}"), format!("{high:#x}")])
    }
}

fn domain_separator(network: &ZodiacNetwork) -> B256 {
    let mut buf = Vec::with_capacity(96);
    buf.extend_from_slice(keccak256(DOMAIN_TYPE).as_slice());
    buf.extend_from_slice(&U256::from(network.chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(network.module_address.into_word().as_slice());
    keccak256(buf)
}

fn transaction_digest(domain: &B256, meta: &MetaTransaction) -> B256 {
    let tx = &meta.transaction;

    let mut buf = Vec::with_capacity(192);
    buf.extend_from_slice(keccak256(TRANSACTION_TYPE).as_slice());
    buf.extend_from_slice(tx.to.into_word().as_slice());
    buf.extend_from_slice(&tx.value.to_be_bytes::<32>());
    buf.extend_from_slice(keccak256(&tx.data).as_slice());
    buf.extend_from_slice(&U256::from(meta.operation).to_be_bytes::<32>());
    buf.extend_from_slice(&U256::from(meta.nonce).to_be_bytes::<32>());
    let struct_hash = keccak256(buf);

    let mut message = Vec::with_capacity(66);
    message.extend_from_slice(&[0x19, 0x01]);
    message.extend_from_slice(domain.as_slice());
    message.extend_from_slice(struct_hash.as_slice());
    keccak256(message)
}

/// Split a 256-bit word into (low, high) 128-bit halves.
fn split_u256(word: B256) -> (u128, u128) {
    let bytes = word.0;
    let mut high = [0u8; 16];
    let mut low = [0u8; 16];
    high.copy_from_slice(&bytes[..16]);
    low.copy_from_slice(&bytes[16..]);
    (u128::from_be_bytes(low), u128::from_be_bytes(high))
}
