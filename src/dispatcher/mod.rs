//! Governance action dispatcher.
//!
//! Composes normalization, executor resolution and authenticator/strategy
//! selection into the public governance actions, and hands the assembled
//! payloads to the transport collaborators.
//!
//! # Action flow
//!
//! ```text
//! propose:  verify_network ─→ normalize ─→ resolve executor ─→ select ─→ propose
//! vote:     verify_network ─→ select (proposal snapshot) ─────────────→ vote
//! finalize: normalize ─→ relayer POST ─→ receipt | Finalization error
//! receive:  verify_network ─→ find executor ─→ normalize ─→ receive_proposal
//! execute:  verify_network ─→ find executor ─→ normalize ─→ execute_proposal_tx_batch
//! ```
//!
//! Each step either succeeds or aborts the whole action; nothing is submitted
//! after a failure. The dispatcher keeps no state between calls and does not
//! enforce proposal stage ordering.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{ActionError, Result};
use crate::execution::{normalize, Eip712ExecutionEncoder, ExecutionEncoder, ExecutorResolver};
use crate::model::{
    Choice, CreateSpaceParams, Envelope, FinalizeRequest, ModuleTransactions, Proposal,
    ProposePayload, Space, Transaction, TxResult, VotePayload,
};
use crate::registry::{PrimitiveKind, StaticRegistry, SupportRegistry};
use crate::selection::select_authenticator_and_strategies;
use crate::transport::{
    FinalizeRelayer, ModuleExecutor, NetworkVerifier, ProposalTransport, SpaceManager,
};

/// Outbound collaborators the dispatcher submits through.
pub struct Transports<W> {
    pub network: Arc<dyn NetworkVerifier<W>>,
    pub spaces: Arc<dyn SpaceManager<W>>,
    pub proposals: Arc<dyn ProposalTransport<W>>,
    pub modules: Arc<dyn ModuleExecutor<W>>,
    pub relayer: Arc<dyn FinalizeRelayer>,
}

impl<W> Clone for Transports<W> {
    fn clone(&self) -> Self {
        Self {
            network: Arc::clone(&self.network),
            spaces: Arc::clone(&self.spaces),
            proposals: Arc::clone(&self.proposals),
            modules: Arc::clone(&self.modules),
            relayer: Arc::clone(&self.relayer),
        }
    }
}

/// Drives the governance lifecycle for spaces on one network.
pub struct ActionDispatcher<W> {
    l1_chain_id: u64,
    resolver: ExecutorResolver,
    registry: Arc<dyn SupportRegistry>,
    transports: Transports<W>,
}

impl<W: Send + Sync> ActionDispatcher<W> {
    pub fn new(
        l1_chain_id: u64,
        resolver: ExecutorResolver,
        registry: Arc<dyn SupportRegistry>,
        transports: Transports<W>,
    ) -> Self {
        Self {
            l1_chain_id,
            resolver,
            registry,
            transports,
        }
    }

    /// Build a dispatcher from configuration, using the EIP-712 encoder for
    /// the configured Zodiac deployments and a static registry.
    pub fn from_config(config: &Config, transports: Transports<W>) -> Self {
        let encoder: Arc<dyn ExecutionEncoder> = Arc::new(Eip712ExecutionEncoder::new(
            config.network.zodiac.iter().cloned(),
        ));
        let resolver = ExecutorResolver::new(config.executors.clone(), encoder);
        let registry = Arc::new(StaticRegistry::from_config(&config.supported));
        Self::new(config.network.l1_chain_id, resolver, registry, transports)
    }

    pub fn l1_chain_id(&self) -> u64 {
        self.l1_chain_id
    }

    async fn verify_network(&self, wallet: &W) -> Result<()> {
        self.transports
            .network
            .verify_network(wallet, self.l1_chain_id)
            .await
            .map_err(|e| {
                error!(expected = self.l1_chain_id, error = %e, "Network verification failed");
                ActionError::from(e)
            })
    }

    /// First executor of the space that the registry supports, in list order.
    fn supported_executor<'a>(&self, space: &'a Space) -> Result<&'a str> {
        space
            .executors
            .iter()
            .find(|id| self.registry.is_supported(PrimitiveKind::Executor, id))
            .map(String::as_str)
            .ok_or_else(|| ActionError::unsupported("unsupported space"))
    }

    /// Deploy a new space. No selection happens: the space does not exist yet.
    #[tracing::instrument(
        name = "action.create_space",
        skip_all,
        fields(controller = %params.controller)
    )]
    pub async fn create_space(&self, wallet: &W, params: CreateSpaceParams) -> Result<TxResult> {
        let result = self.transports.spaces.deploy_space(wallet, params).await?;
        info!(tx = %result.transaction_hash, "Space deployment submitted");
        Ok(result)
    }

    #[tracing::instrument(name = "action.set_metadata_uri", skip_all, fields(space = %space_id))]
    pub async fn set_metadata_uri(
        &self,
        wallet: &W,
        space_id: &str,
        metadata_uri: &str,
    ) -> Result<TxResult> {
        Ok(self
            .transports
            .spaces
            .set_metadata_uri(wallet, space_id, metadata_uri)
            .await?)
    }

    /// Submit a proposal whose metadata lives at `ipfs://<cid>`.
    ///
    /// Selection runs against the space's current configuration.
    #[tracing::instrument(name = "action.propose", skip_all, fields(space = %space.id))]
    pub async fn propose(
        &self,
        wallet: &W,
        account: &str,
        space: &Space,
        cid: &str,
        transactions: &[Transaction],
    ) -> Result<TxResult> {
        self.verify_network(wallet).await?;

        let meta = normalize(transactions);
        let execution = self.resolver.resolve(space, &meta)?;
        let selection = select_authenticator_and_strategies(
            &*self.registry,
            &space.authenticators,
            &space.strategies,
        )?;

        let payload = ProposePayload {
            space: space.id.clone(),
            authenticator: selection.authenticator,
            strategies: selection.strategies,
            metadata_uri: format!("ipfs://{cid}"),
            executor: execution.executor().to_string(),
            execution_params: execution.execution_params().to_vec(),
        };
        debug!(executor = %payload.executor, "Submitting proposal");

        let result = self.transports.proposals.propose(wallet, account, payload).await?;
        info!(tx = %result.transaction_hash, "Proposal submitted");
        Ok(result)
    }

    /// Cast a vote.
    ///
    /// Strategies come from the proposal's snapshot, which may differ from
    /// the space's current list.
    #[tracing::instrument(
        name = "action.vote",
        skip_all,
        fields(space = %proposal.space.id, proposal = proposal.proposal_id)
    )]
    pub async fn vote(
        &self,
        wallet: &W,
        account: &str,
        proposal: &Proposal,
        choice: Choice,
    ) -> Result<TxResult> {
        self.verify_network(wallet).await?;

        let selection = select_authenticator_and_strategies(
            &*self.registry,
            &proposal.space.authenticators,
            &proposal.strategies,
        )?;

        let payload = VotePayload {
            space: proposal.space.id.clone(),
            authenticator: selection.authenticator,
            strategies: selection.strategies,
            proposal: proposal.proposal_id,
            choice: choice.as_u8(),
        };

        let result = self.transports.proposals.vote(wallet, account, payload).await?;
        info!(tx = %result.transaction_hash, choice = ?choice, "Vote submitted");
        Ok(result)
    }

    /// Ask the relayer to finalize a proposal.
    ///
    /// Returns the relayer's receipt unchanged. Any `error` in the response,
    /// or failing to reach the relayer at all, is a finalization failure.
    #[tracing::instrument(
        name = "action.finalize_proposal",
        skip_all,
        fields(space = %proposal.space.id, proposal = proposal.proposal_id)
    )]
    pub async fn finalize_proposal(
        &self,
        proposal: &Proposal,
    ) -> Result<Option<serde_json::Value>> {
        let request = FinalizeRequest {
            transactions: normalize(&proposal.execution),
        };

        let response = self
            .transports
            .relayer
            .finalize(&proposal.space.id, proposal.proposal_id, request)
            .await
            .map_err(|e| {
                error!(error = %e, "Relayer request failed");
                ActionError::Finalization(e.to_string())
            })?;

        if let Some(reason) = response.error {
            error!(reason = %reason, "Relayer reported finalization error");
            return Err(ActionError::Finalization(error_message(&reason)));
        }

        info!("Proposal finalized");
        Ok(response.receipt)
    }

    /// Hand a finalized proposal's transactions to the L1 module.
    #[tracing::instrument(
        name = "action.receive_proposal",
        skip_all,
        fields(space = %proposal.space.id, proposal = proposal.proposal_id)
    )]
    pub async fn receive_proposal(&self, wallet: &W, proposal: &Proposal) -> Result<TxResult> {
        self.verify_network(wallet).await?;

        let executor = self.supported_executor(&proposal.space)?;
        let transactions = ModuleTransactions {
            transactions: normalize(&proposal.execution),
        };

        let result = self
            .transports
            .modules
            .receive_proposal(wallet, &proposal.space.id, executor, transactions)
            .await?;
        info!(executor = %executor, tx = %result.transaction_hash, "Proposal received on L1");
        Ok(result)
    }

    /// Execute a received proposal's transaction batch.
    ///
    /// `proposal_index` is the module's index for the proposal; there is no
    /// way to discover it from the proposal itself.
    #[tracing::instrument(
        name = "action.execute_transactions",
        skip_all,
        fields(space = %proposal.space.id, proposal = proposal.proposal_id, index = proposal_index)
    )]
    pub async fn execute_transactions(
        &self,
        wallet: &W,
        proposal: &Proposal,
        proposal_index: u64,
    ) -> Result<TxResult> {
        self.verify_network(wallet).await?;

        let executor = self.supported_executor(&proposal.space)?;
        let transactions = normalize(&proposal.execution);

        let result = self
            .transports
            .modules
            .execute_proposal_tx_batch(wallet, proposal_index, executor, transactions)
            .await?;
        info!(executor = %executor, tx = %result.transaction_hash, "Transactions executed");
        Ok(result)
    }

    /// Forward a signed envelope untouched.
    #[tracing::instrument(name = "action.send", skip_all)]
    pub async fn send(&self, envelope: Envelope) -> Result<TxResult> {
        Ok(self.transports.proposals.send(envelope).await?)
    }
}

/// Relayer errors are usually strings; anything else is reported as JSON.
fn error_message(reason: &serde_json::Value) -> String {
    match reason {
        serde_json::Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}
