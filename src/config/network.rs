//! Network configuration types.

use serde::Deserialize;

use crate::execution::ZodiacNetwork;

/// Default L1 chain id (Goerli).
pub const DEFAULT_L1_CHAIN_ID: u64 = 5;
/// Default Ethereum RPC endpoint.
pub const DEFAULT_ETH_RPC_URL: &str = "http://localhost:8545";

/// L1 network the dispatcher signs against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain id the wallet must be connected to.
    pub l1_chain_id: u64,
    /// Ethereum RPC endpoint for the embedder's L1 transports.
    ///
    /// The dispatcher never dials it. Callers read it when constructing the
    /// [`NetworkVerifier`](crate::transport::NetworkVerifier) and
    /// [`ModuleExecutor`](crate::transport::ModuleExecutor) they pass in.
    pub eth_rpc_url: String,
    /// Zodiac module deployments, one per executor id.
    pub zodiac: Vec<ZodiacNetwork>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            l1_chain_id: DEFAULT_L1_CHAIN_ID,
            eth_rpc_url: DEFAULT_ETH_RPC_URL.to_string(),
            zodiac: Vec::new(),
        }
    }
}
