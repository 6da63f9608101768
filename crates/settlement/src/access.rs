//! Single-owner access control.

use dropcraft_core::{hex_encode, Address};
use parking_lot::RwLock;
use tracing::info;

use crate::{AccessControl, Result, SettlementError};

/// One designated owner; ownership can be handed over by the owner only.
#[derive(Debug)]
pub struct Ownable {
    owner: RwLock<Address>,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self {
            owner: RwLock::new(owner),
        }
    }

    /// Hand ownership to `new_owner`. Fails with `NotOwner` for anyone else.
    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<()> {
        let mut owner = self.owner.write();
        if *owner != *caller {
            return Err(SettlementError::NotOwner);
        }
        info!(
            "Ownership transferred from {} to {}",
            hex_encode(&owner[..4]),
            hex_encode(&new_owner[..4]),
        );
        *owner = new_owner;
        Ok(())
    }
}

impl AccessControl for Ownable {
    fn owner(&self) -> Address {
        *self.owner.read()
    }
}
