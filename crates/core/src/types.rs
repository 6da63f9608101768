use serde::{Deserialize, Serialize};

use crate::encoding::{serde_address, serde_amount};

/// 32-byte Keccak-256 digest (leaves, internal nodes, roots)
pub type Hash = [u8; 32];

/// 20-byte account address
pub type Address = [u8; 20];

/// Token identifier (the token contract address)
pub type TokenId = Address;

/// Unsigned 256-bit token amount
pub type Amount = primitive_types::U256;

/// A recipient's claimable `(index, account, amount)` record.
///
/// `index` is assigned by whoever produced the entitlement list and is the
/// key of the replay-protection bitmap. It is never re-derived from the
/// position of the record after sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub index: u64,
    #[serde(with = "serde_address")]
    pub account: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

impl Entitlement {
    pub fn new(index: u64, account: Address, amount: impl Into<Amount>) -> Self {
        Self {
            index,
            account,
            amount: amount.into(),
        }
    }
}

/// A `(account, amount)` pair without an index.
///
/// Balance lists in this shape get their indices from list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Balance {
    #[serde(with = "serde_address")]
    pub account: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
}

impl Balance {
    /// Assign indices `0..n` in list order.
    pub fn into_entitlements(balances: &[Balance]) -> Vec<Entitlement> {
        balances
            .iter()
            .enumerate()
            .map(|(i, b)| Entitlement::new(i as u64, b.account, b.amount))
            .collect()
    }
}
