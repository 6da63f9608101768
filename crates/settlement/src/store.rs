//! Distributor state: token → root registry and per-token claimed bitmaps.
//!
//! The store is a cheap-to-clone handle over shared state. Mutation is
//! crate-private so every write goes through the distributor's owner gate
//! and claim path; readers (indexers, tests) may hold their own handle.

use std::collections::HashMap;
use std::sync::Arc;

use dropcraft_core::{Hash, TokenId};
use parking_lot::RwLock;

use crate::{ClaimedBitmap, Result, SettlementError};

#[derive(Debug, Default)]
struct StoreState {
    /// Current root per token
    roots: HashMap<TokenId, Hash>,
    /// Claimed indices per token. Never reset by a root change.
    claimed: HashMap<TokenId, ClaimedBitmap>,
}

/// Shared handle to the registry and bitmaps.
#[derive(Debug, Clone, Default)]
pub struct DistributorStore {
    state: Arc<RwLock<StoreState>>,
}

impl DistributorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current root for `token`, if one was ever set.
    pub fn root(&self, token: &TokenId) -> Option<Hash> {
        self.state.read().roots.get(token).copied()
    }

    /// Tokens with a registered root.
    pub fn tokens(&self) -> Vec<TokenId> {
        self.state.read().roots.keys().copied().collect()
    }

    pub fn is_claimed(&self, token: &TokenId, index: u64) -> bool {
        self.state
            .read()
            .claimed
            .get(token)
            .is_some_and(|bitmap| bitmap.is_claimed(index))
    }

    /// Number of claimed indices for `token`.
    pub fn claimed_count(&self, token: &TokenId) -> u64 {
        self.state
            .read()
            .claimed
            .get(token)
            .map(ClaimedBitmap::count)
            .unwrap_or(0)
    }

    /// Overwrite the root for `token`, returning the previous one.
    pub(crate) fn set_root(&self, token: TokenId, root: Hash) -> Option<Hash> {
        self.state.write().roots.insert(token, root)
    }

    /// Atomically check the claim preconditions and set the claimed bit.
    ///
    /// Checks in order: already claimed, then `candidate_root` against the
    /// registered root. On success returns the root the claim matched.
    pub(crate) fn mark_claimed(&self, token: &TokenId, index: u64, candidate_root: &Hash) -> Result<Hash> {
        let mut state = self.state.write();

        if state.claimed.get(token).is_some_and(|bitmap| bitmap.is_claimed(index)) {
            return Err(SettlementError::AlreadyClaimed { index });
        }

        let root = match state.roots.get(token) {
            Some(root) if root == candidate_root => *root,
            _ => return Err(SettlementError::InvalidProof),
        };

        state.claimed.entry(*token).or_default().set_claimed(index);
        Ok(root)
    }

    /// Undo a mark whose payout failed.
    pub(crate) fn unmark_claimed(&self, token: &TokenId, index: u64) {
        let mut state = self.state.write();
        if let Some(bitmap) = state.claimed.get_mut(token) {
            bitmap.clear(index);
            if bitmap.is_empty() {
                state.claimed.remove(token);
            }
        }
    }
}
