//! Settlement types
//!
//! Receipts returned to claimers and the events emitted to observers.

use dropcraft_core::{Address, Amount, Hash, TokenId};

/// Proof of a successful claim, returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub token: TokenId,
    pub index: u64,
    pub account: Address,
    pub amount: Amount,
    /// Root the claim was verified against
    pub root: Hash,
}

/// Emitted on every successful claim.
///
/// Indexers rely on this together with the queryable root/claim state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claimed {
    pub token: TokenId,
    pub index: u64,
    pub account: Address,
    pub amount: Amount,
}

impl From<&ClaimReceipt> for Claimed {
    fn from(receipt: &ClaimReceipt) -> Self {
        Self {
            token: receipt.token,
            index: receipt.index,
            account: receipt.account,
            amount: receipt.amount,
        }
    }
}
