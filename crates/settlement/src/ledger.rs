//! In-memory token ledger.
//!
//! Tracks, per token, the balance held by the distributor and the amounts
//! paid out to each account. Used for local simulation and tests.

use std::collections::HashMap;

use dropcraft_core::{hex_encode, Address, Amount, TokenId};
use parking_lot::Mutex;
use tracing::debug;

use crate::{TokenLedger, TransferError};

#[derive(Debug, Default)]
struct LedgerState {
    /// Distributor holdings per token
    reserves: HashMap<TokenId, Amount>,
    /// Received amounts per (token, account)
    balances: HashMap<(TokenId, Address), Amount>,
}

/// A `TokenLedger` backed by in-memory balances.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distributor's holdings of `token`.
    pub fn set_balance(&self, token: TokenId, amount: Amount) {
        self.state.lock().reserves.insert(token, amount);
    }

    /// Distributor holdings of `token`.
    pub fn reserve_of(&self, token: &TokenId) -> Amount {
        self.state.lock().reserves.get(token).copied().unwrap_or_default()
    }

    /// Amount of `token` paid out to `account`.
    pub fn balance_of(&self, token: &TokenId, account: &Address) -> Amount {
        self.state
            .lock()
            .balances
            .get(&(*token, *account))
            .copied()
            .unwrap_or_default()
    }
}

impl TokenLedger for InMemoryLedger {
    fn transfer(&self, token: &TokenId, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.lock();

        let available = state.reserves.get(token).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientBalance { available, requested: amount })?;
        state.reserves.insert(*token, remaining);

        let received = state.balances.entry((*token, *to)).or_default();
        *received = received.saturating_add(amount);

        debug!(
            "Transferred {} of token {} to {} ({} left)",
            amount,
            hex_encode(&token[..4]),
            hex_encode(&to[..4]),
            remaining,
        );
        Ok(())
    }
}
