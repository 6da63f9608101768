//! Merkle distributor.
//!
//! Owns a [`DistributorStore`] and consumes three capabilities: access
//! control for root changes, a token ledger for payouts, and event sinks
//! for notifications.
//!
//! Claim ordering is check, mark, then pay. The claimed bit is committed
//! before the ledger transfer runs and no lock is held across it, so a
//! ledger that calls back into `claim` sees the index as claimed instead
//! of deadlocking or paying twice.

use std::sync::Arc;

use dropcraft_core::{compute_root, hex_encode, leaf_hash, Address, Amount, Hash, TokenId};
use tracing::{debug, info, warn};

use crate::{
    AccessControl, ClaimReceipt, Claimed, DistributorConfig, DistributorStore, EventSink, Ownable, Result,
    SettlementError, TokenLedger, TracingSink,
};

/// Per-token Merkle distributor.
pub struct Distributor {
    store: DistributorStore,
    access: Arc<dyn AccessControl>,
    ledger: Arc<dyn TokenLedger>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Distributor {
    /// Create a distributor with an empty store.
    pub fn new(access: Arc<dyn AccessControl>, ledger: Arc<dyn TokenLedger>, events: Arc<dyn EventSink>) -> Self {
        Self::with_store(DistributorStore::new(), access, ledger, events)
    }

    /// Create a distributor over an existing store handle.
    pub fn with_store(
        store: DistributorStore,
        access: Arc<dyn AccessControl>,
        ledger: Arc<dyn TokenLedger>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            access,
            ledger,
            sinks: vec![events],
        }
    }

    /// Build from config: `Ownable` owner, initial roots, optional tracing sink.
    pub fn from_config(
        config: &DistributorConfig,
        ledger: Arc<dyn TokenLedger>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;

        let mut distributor = Self::new(Arc::new(Ownable::new(config.owner)), ledger, events);
        if config.trace_events {
            distributor.add_sink(Arc::new(TracingSink));
        }
        for entry in &config.roots {
            distributor.set_root(&config.owner, entry.token, entry.root)?;
        }
        Ok(distributor)
    }

    /// Register an additional event sink.
    pub fn add_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Handle to the underlying store (read access for observers).
    pub fn store(&self) -> &DistributorStore {
        &self.store
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    // ==================== Root Registry ====================

    /// Publish or replace the root for `token`. Owner only.
    ///
    /// Does not touch the claimed bitmap: indices claimed under an earlier
    /// root stay claimed under the new one.
    pub fn set_root(&self, caller: &Address, token: TokenId, root: Hash) -> Result<()> {
        if !self.access.is_owner(caller) {
            warn!(
                "Rejected root change for token {} from non-owner {}",
                hex_encode(&token[..4]),
                hex_encode(&caller[..4]),
            );
            return Err(SettlementError::NotOwner);
        }

        let previous = self.store.set_root(token, root);
        info!(
            "Root for token {} set to {} (previous: {})",
            hex_encode(&token[..4]),
            hex_encode(&root[..8]),
            previous.map(|r| hex_encode(&r[..8])).unwrap_or_else(|| "none".to_string()),
        );
        Ok(())
    }

    /// Current root for `token`.
    pub fn merkle_root(&self, token: &TokenId) -> Option<Hash> {
        self.store.root(token)
    }

    // ==================== Claims ====================

    /// Whether `index` has been claimed for `token`. False for unknown tokens.
    pub fn is_claimed(&self, token: &TokenId, index: u64) -> bool {
        self.store.is_claimed(token, index)
    }

    /// Redeem an entitlement.
    ///
    /// Fails with `AlreadyClaimed` if the index is taken, `InvalidProof` if
    /// the proof does not lead to the token's registered root, and
    /// `TransferFailed` if the ledger rejects the payout. Every failure
    /// leaves the store unchanged.
    pub fn claim(
        &self,
        token: &TokenId,
        index: u64,
        account: &Address,
        amount: Amount,
        proof: &[Hash],
    ) -> Result<ClaimReceipt> {
        let leaf = leaf_hash(index, account, amount);
        let candidate = compute_root(&leaf, proof);
        debug!(
            "Claim for token {} index {}: leaf {}, {} proof nodes, candidate root {}",
            hex_encode(&token[..4]),
            index,
            hex_encode(&leaf[..8]),
            proof.len(),
            hex_encode(&candidate[..8]),
        );

        let root = self.store.mark_claimed(token, index, &candidate).map_err(|e| {
            warn!(
                "Rejected claim for token {} index {} by {}: {}",
                hex_encode(&token[..4]),
                index,
                hex_encode(&account[..4]),
                e,
            );
            e
        })?;

        if let Err(e) = self.ledger.transfer(token, account, amount) {
            self.store.unmark_claimed(token, index);
            warn!(
                "Transfer failed for token {} index {}, claim rolled back: {}",
                hex_encode(&token[..4]),
                index,
                e,
            );
            return Err(SettlementError::TransferFailed(e.to_string()));
        }

        let receipt = ClaimReceipt {
            token: *token,
            index,
            account: *account,
            amount,
            root,
        };

        let event = Claimed::from(&receipt);
        for sink in &self.sinks {
            sink.claimed(&event);
        }

        info!(
            "Claimed index {} of token {}: {} to {}",
            index,
            hex_encode(&token[..4]),
            amount,
            hex_encode(&account[..4]),
        );
        Ok(receipt)
    }
}
