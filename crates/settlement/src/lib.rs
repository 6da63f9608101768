//! DropCraft Settlement
//!
//! Ledger side of a Merkle distribution.
//!
//! ## Claim Flow
//!
//! 1. **Set Root**: The owner publishes the Merkle root of a token's
//!    entitlement list. Overwriting a root is allowed and does not clear
//!    previously recorded claims.
//! 2. **Claim**: A recipient submits `(token, index, account, amount, proof)`.
//!    The ledger recomputes the root from the proof, marks the index claimed,
//!    then pays out through the [`TokenLedger`] capability.
//! 3. **Replay protection**: A per-token claimed bitmap keyed by index. The
//!    mark is committed before the transfer and rolled back if it fails.

mod access;
mod bitmap;
mod config;
mod distributor;
mod events;
mod ledger;
mod store;
mod traits;
mod types;

pub use access::Ownable;
pub use bitmap::ClaimedBitmap;
pub use config::{DistributorConfig, RootEntry};
pub use distributor::Distributor;
pub use events::{EventLog, TracingSink};
pub use ledger::InMemoryLedger;
pub use store::DistributorStore;
pub use traits::{AccessControl, EventSink, TokenLedger, TransferError};
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Index {index} already claimed")]
    AlreadyClaimed { index: u64 },

    #[error("Invalid proof")]
    InvalidProof,

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SettlementError>;
