//! Serialized distribution file.
//!
//! Produced once per token by the builder and handed to recipients through
//! whatever channel the operator uses (file, API). Hashes and addresses are
//! `0x`-prefixed hex, amounts are decimal strings, and each claim carries
//! its proof as an ordered list of sibling hashes.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use dropcraft_core::{
    hex_encode, leaf_hash, serde_address, serde_amount, serde_hash, Address, Amount, Entitlement, Hash, TokenId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::merkle::MerkleTree;
use crate::{Result, TreeError};

/// One recipient's claim: the entitlement plus its Merkle proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub index: u64,
    #[serde(with = "serde_address")]
    pub account: Address,
    #[serde(with = "serde_amount")]
    pub amount: Amount,
    #[serde(with = "serde_hash::list")]
    pub proof: Vec<Hash>,
}

impl ClaimEntry {
    pub fn entitlement(&self) -> Entitlement {
        Entitlement::new(self.index, self.account, self.amount)
    }

    /// Whether this claim's proof reproduces `root`.
    pub fn verify(&self, root: &Hash) -> bool {
        let leaf = leaf_hash(self.index, &self.account, self.amount);
        MerkleTree::verify(root, &leaf, &self.proof)
    }
}

/// A built distribution: the root to publish plus every recipient's claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(with = "serde_hash")]
    pub merkle_root: Hash,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_token")]
    pub token: Option<TokenId>,
    #[serde(with = "serde_amount")]
    pub total_amount: Amount,
    /// Claims in source-list order (leaf order).
    pub claims: Vec<ClaimEntry>,
}

impl Distribution {
    /// Build the tree over `entries` and collect every proof.
    pub fn from_entitlements(token: Option<TokenId>, entries: &[Entitlement]) -> Result<Self> {
        let tree = MerkleTree::from_entitlements(entries)?;

        let total_amount = entries
            .iter()
            .try_fold(Amount::zero(), |acc, e| acc.checked_add(e.amount))
            .ok_or(TreeError::AmountOverflow)?;

        let claims = entries
            .iter()
            .enumerate()
            .map(|(position, e)| {
                let proof = tree.proof(position)?;
                Ok(ClaimEntry {
                    index: e.index,
                    account: e.account,
                    amount: e.amount,
                    proof: proof.siblings,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Built distribution: {} claims, total {}, root {}",
            claims.len(),
            total_amount,
            hex_encode(&tree.root()[..8]),
        );

        Ok(Self {
            merkle_root: tree.root(),
            token,
            total_amount,
            claims,
        })
    }

    /// Claim for an entitlement index (first match if indices repeat).
    pub fn claim_for_index(&self, index: u64) -> Option<&ClaimEntry> {
        self.claims.iter().find(|c| c.index == index)
    }

    /// First claim belonging to `account`.
    pub fn claim_for_account(&self, account: &Address) -> Option<&ClaimEntry> {
        self.claims.iter().find(|c| &c.account == account)
    }

    /// Re-check every claim's proof against the root.
    pub fn verify_all(&self) -> Result<()> {
        if self.claims.is_empty() {
            return Err(TreeError::EmptyInput);
        }
        for claim in &self.claims {
            if !claim.verify(&self.merkle_root) {
                return Err(TreeError::ProofMismatch { index: claim.index });
            }
        }
        debug!("Verified {} proofs against root", self.claims.len());
        Ok(())
    }

    /// Write the distribution as pretty JSON, atomically (temp file + rename).
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Read a distribution file written by [`Distribution::write_to`].
    pub fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

mod serde_token {
    use dropcraft_core::{hex_encode, parse_address, TokenId};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<TokenId>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(token) => s.serialize_some(&hex_encode(token)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<TokenId>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| parse_address(&raw).map_err(D::Error::custom))
            .transpose()
    }
}
