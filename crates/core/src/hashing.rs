//! Hashing rules shared by the tree builder and the settlement ledger.
//!
//! Leaf formula: `keccak256(index_be32 || account || amount_be32)`, the
//! packed ABI layout of `(uint256, address, uint256)`.
//! Internal nodes: `keccak256(min(a, b) || max(a, b))`.
//!
//! Both sides MUST use these exact functions; any change alters every root.

use sha3::{Digest, Keccak256};

use crate::{Address, Amount, Hash};

/// Length of the packed leaf encoding: uint256 index, address, uint256 amount.
pub const LEAF_ENCODING_LEN: usize = 32 + 20 + 32;

/// Packed encoding of one entitlement.
///
/// Every field is fixed width, so two different triples never share an
/// encoding.
pub fn encode_leaf(index: u64, account: &Address, amount: Amount) -> [u8; LEAF_ENCODING_LEN] {
    let mut out = [0u8; LEAF_ENCODING_LEN];
    out[24..32].copy_from_slice(&index.to_be_bytes());
    out[32..52].copy_from_slice(account);
    amount.to_big_endian(&mut out[52..84]);
    out
}

/// Compute the leaf hash for an entitlement.
pub fn leaf_hash(index: u64, account: &Address, amount: Amount) -> Hash {
    Keccak256::digest(encode_leaf(index, account, amount)).into()
}

/// Hash two child nodes to produce a parent. Argument order is irrelevant.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(lo)
        .chain_update(hi)
        .finalize()
        .into()
}

/// Fold a proof onto a leaf, bottom-up, and return the implied root.
///
/// An empty proof yields the leaf itself.
pub fn compute_root(leaf: &Hash, proof: &[Hash]) -> Hash {
    proof
        .iter()
        .fold(*leaf, |current, sibling| hash_pair(&current, sibling))
}
