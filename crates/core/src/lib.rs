//! DropCraft Core
//!
//! Primitive types shared by the tree builder and the settlement ledger:
//! fixed-width hashes and addresses, 256-bit amounts, the `Entitlement`
//! record, the hex helpers used by every serialized artifact, and the
//! hashing rules both sides must agree on.

mod encoding;
mod error;
mod hashing;
mod types;

pub use encoding::{hex_encode, parse_address, parse_amount, parse_hash, serde_address, serde_amount, serde_hash};
pub use error::{CoreError, Result};
pub use hashing::{compute_root, encode_leaf, hash_pair, leaf_hash, LEAF_ENCODING_LEN};
pub use types::*;
