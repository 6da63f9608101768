//! Binary Merkle tree for entitlement distributions.
//!
//! Leaf formula: `keccak256(index_be32 || account || amount_be32)`.
//! Internal nodes: `keccak256(min(a, b) || max(a, b))` (sorted pair).
//! If a level has an odd node count, the trailing node is paired with itself.
//!
//! Because pairs are sorted before hashing, a proof is just the list of
//! sibling hashes: the verifier never needs to know which side it is on.

use dropcraft_core::{compute_root, hash_pair, leaf_hash, Entitlement, Hash};
use tracing::debug;

use crate::{Result, TreeError};

/// A Merkle proof: sibling hashes from the leaf level up to (not including) the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Sibling hashes, bottom-up.
    pub siblings: Vec<Hash>,
    /// Position of the leaf in the source list (informational only).
    pub position: usize,
}

/// A binary Merkle tree over a fixed, non-empty leaf sequence.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes stored level by level, bottom-up. `layers[0]` = leaves.
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from entitlements, one leaf per entry in list order.
    ///
    /// Indices are taken from the entries as-is; duplicates are not rejected.
    pub fn from_entitlements(entries: &[Entitlement]) -> Result<Self> {
        let leaves = entries
            .iter()
            .map(|e| leaf_hash(e.index, &e.account, e.amount))
            .collect();
        Self::from_leaves(leaves)
    }

    /// Build a tree from pre-hashed leaves.
    pub fn from_leaves(leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(TreeError::EmptyInput);
        }

        let mut layers = vec![leaves];
        loop {
            let prev = &layers[layers.len() - 1];
            if prev.len() == 1 {
                break;
            }
            let next_layer: Vec<Hash> = prev
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    hash_pair(left, right)
                })
                .collect();
            layers.push(next_layer);
        }

        debug!(
            "Built Merkle tree: {} leaves, depth {}",
            layers[0].len(),
            layers.len() - 1,
        );

        Ok(Self { layers })
    }

    /// Get the Merkle root.
    pub fn root(&self) -> Hash {
        self.layers[self.layers.len() - 1][0]
    }

    /// Generate a proof for the leaf at `position` in the source list.
    pub fn proof(&self, position: usize) -> Result<MerkleProof> {
        let leaf_count = self.leaf_count();
        if position >= leaf_count {
            return Err(TreeError::IndexOutOfRange { position, leaf_count });
        }

        let mut siblings = Vec::with_capacity(self.depth());
        let mut idx = position;

        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling_idx = idx ^ 1;
            // Trailing odd node was paired with itself
            let sibling = layer.get(sibling_idx).unwrap_or(&layer[idx]);
            siblings.push(*sibling);
            idx /= 2;
        }

        Ok(MerkleProof { siblings, position })
    }

    /// Verify a proof against a root and leaf hash.
    pub fn verify(root: &Hash, leaf: &Hash, proof: &[Hash]) -> bool {
        compute_root(leaf, proof) == *root
    }

    /// Leaf hash at `position`, if any.
    pub fn leaf(&self, position: usize) -> Option<Hash> {
        self.layers[0].get(position).copied()
    }

    /// Number of leaves (no padding is ever added).
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of levels above the leaves; equals every proof's length.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropcraft_core::Amount;

    fn entry(index: u64, account: u8, amount: u64) -> Entitlement {
        Entitlement::new(index, [account; 20], amount)
    }

    fn leaf_of(e: &Entitlement) -> Hash {
        leaf_hash(e.index, &e.account, e.amount)
    }

    #[test]
    fn test_empty_entries() {
        assert!(matches!(MerkleTree::from_entitlements(&[]), Err(TreeError::EmptyInput)));
    }

    #[test]
    fn test_single_leaf() {
        let entries = vec![entry(0, 1, 100)];
        let tree = MerkleTree::from_entitlements(&entries).unwrap();

        // Single leaf: root == leaf, empty proof
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root(), leaf_of(&entries[0]));
        assert!(tree.proof(0).unwrap().siblings.is_empty());
    }

    #[test]
    fn test_two_leaves() {
        let entries = vec![entry(0, 1, 100), entry(1, 2, 101)];
        let tree = MerkleTree::from_entitlements(&entries).unwrap();

        let l0 = leaf_of(&entries[0]);
        let l1 = leaf_of(&entries[1]);
        assert_eq!(tree.root(), hash_pair(&l0, &l1));
        assert_eq!(tree.proof(0).unwrap().siblings, vec![l1]);
        assert_eq!(tree.proof(1).unwrap().siblings, vec![l0]);
    }

    #[test]
    fn test_odd_level_self_pairs() {
        // 3 entries: trailing leaf is hashed with itself, never padded
        let entries = vec![entry(0, 1, 10), entry(1, 2, 20), entry(2, 3, 30)];
        let tree = MerkleTree::from_entitlements(&entries).unwrap();
        assert_eq!(tree.leaf_count(), 3);

        let l0 = leaf_of(&entries[0]);
        let l1 = leaf_of(&entries[1]);
        let l2 = leaf_of(&entries[2]);
        let h01 = hash_pair(&l0, &l1);
        let h22 = hash_pair(&l2, &l2);
        assert_eq!(tree.root(), hash_pair(&h01, &h22));

        let proof = tree.proof(2).unwrap();
        assert_eq!(proof.siblings, vec![l2, h01]);

        let padded = hash_pair(&h01, &hash_pair(&l2, &[0u8; 32]));
        assert_ne!(tree.root(), padded);
    }

    #[test]
    fn test_proof_verify_all_positions() {
        for n in 1..=17u8 {
            let entries: Vec<_> = (0..n).map(|i| entry(i as u64, i, i as u64 * 100)).collect();
            let tree = MerkleTree::from_entitlements(&entries).unwrap();
            let root = tree.root();

            for (i, e) in entries.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert_eq!(proof.siblings.len(), tree.depth());
                assert!(
                    MerkleTree::verify(&root, &leaf_of(e), &proof.siblings),
                    "proof for leaf {} of {} should verify",
                    i,
                    n
                );
            }
        }
    }

    #[test]
    fn test_depth_is_ceil_log2() {
        let expected = [(1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (17, 5)];
        for (n, depth) in expected {
            let entries: Vec<_> = (0..n).map(|i| entry(i as u64, 1, 1)).collect();
            let tree = MerkleTree::from_entitlements(&entries).unwrap();
            assert_eq!(tree.depth(), depth, "depth for {} leaves", n);
        }
    }

    #[test]
    fn test_wrong_leaf_fails() {
        let entries = vec![entry(0, 1, 10), entry(1, 2, 20)];
        let tree = MerkleTree::from_entitlements(&entries).unwrap();
        let proof = tree.proof(0).unwrap();

        let wrong_leaf = leaf_hash(0, &[1u8; 20], Amount::from(11u64));
        assert!(!MerkleTree::verify(&tree.root(), &wrong_leaf, &proof.siblings));
    }

    #[test]
    fn test_mutated_proof_fails() {
        let entries: Vec<_> = (0..6u8).map(|i| entry(i as u64, i, 50)).collect();
        let tree = MerkleTree::from_entitlements(&entries).unwrap();
        let leaf = leaf_of(&entries[4]);
        let proof = tree.proof(4).unwrap();

        for level in 0..proof.siblings.len() {
            for byte in [0usize, 17, 31] {
                let mut mutated = proof.siblings.clone();
                mutated[level][byte] ^= 0x01;
                assert!(!MerkleTree::verify(&tree.root(), &leaf, &mutated));
            }
        }
    }

    #[test]
    fn test_proof_out_of_range() {
        let entries = vec![entry(0, 1, 10), entry(1, 2, 20)];
        let tree = MerkleTree::from_entitlements(&entries).unwrap();
        assert!(matches!(
            tree.proof(2),
            Err(TreeError::IndexOutOfRange { position: 2, leaf_count: 2 })
        ));
    }

    #[test]
    fn test_deterministic() {
        let entries = vec![entry(0, 1, 10), entry(1, 2, 20), entry(2, 3, 30)];
        let tree1 = MerkleTree::from_entitlements(&entries).unwrap();
        let tree2 = MerkleTree::from_entitlements(&entries).unwrap();
        assert_eq!(tree1.root(), tree2.root());
    }

    #[test]
    fn test_leaf_order_matters() {
        let entries = vec![entry(0, 1, 10), entry(1, 2, 20), entry(2, 3, 30)];
        let reordered = vec![entries[2], entries[0], entries[1]];
        let tree1 = MerkleTree::from_entitlements(&entries).unwrap();
        let tree2 = MerkleTree::from_entitlements(&reordered).unwrap();
        assert_ne!(tree1.root(), tree2.root());
    }
}
