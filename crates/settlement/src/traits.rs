//! Capabilities the distributor consumes and exposes.
//!
//! The distributor holds no token balances and no identity logic of its
//! own: payouts go through a [`TokenLedger`], the owner check through an
//! [`AccessControl`], and notifications out through an [`EventSink`].

use dropcraft_core::{Address, Amount, TokenId};

use crate::Claimed;

/// Failure reported by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Insufficient balance: have {available}, need {requested}")]
    InsufficientBalance { available: Amount, requested: Amount },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Token transfer capability.
///
/// Must return synchronously. Implementations may call back into the
/// distributor (reentrancy); the distributor tolerates that.
pub trait TokenLedger: Send + Sync {
    /// Move `amount` of `token` from the distributor's holdings to `to`.
    fn transfer(&self, token: &TokenId, to: &Address, amount: Amount) -> Result<(), TransferError>;
}

/// Single-owner authorization capability.
pub trait AccessControl: Send + Sync {
    /// Current owner identity.
    fn owner(&self) -> Address;

    /// Whether `caller` may perform owner-only operations.
    fn is_owner(&self, caller: &Address) -> bool {
        self.owner() == *caller
    }
}

/// Receiver of distributor notifications.
pub trait EventSink: Send + Sync {
    fn claimed(&self, event: &Claimed);
}
