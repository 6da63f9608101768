//! DropCraft Tree
//!
//! Off-line side of a distribution: builds the binary Merkle tree over an
//! entitlement list, answers root and proof queries, and serializes the
//! per-recipient proofs into a distribution file.
//!
//! Leaf and pair hashing come from `dropcraft-core`, the same functions the
//! settlement ledger uses to recompute roots from submitted proofs. The only
//! rule owned here is tree shape: odd-width levels self-pair their trailing
//! node.

pub mod distribution;
pub mod input;
pub mod merkle;

pub use distribution::{ClaimEntry, Distribution};
pub use input::{load_entitlements, parse_entitlements_csv, parse_entitlements_json};
pub use dropcraft_core::{compute_root, hash_pair, leaf_hash};
pub use merkle::{MerkleProof, MerkleTree};

use dropcraft_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Empty entitlement list")]
    EmptyInput,

    #[error("Position {position} is out of range for tree with {leaf_count} leaves")]
    IndexOutOfRange { position: usize, leaf_count: usize },

    #[error("Total amount overflows uint256")]
    AmountOverflow,

    #[error("Proof for index {index} does not reproduce the root")]
    ProofMismatch { index: u64 },

    #[error("Entry {entry} disagrees with the first entry on carrying an index")]
    MixedIndices { entry: usize },

    #[error("Invalid input at line {line}: {reason}")]
    InvalidInput { line: usize, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;
