//! Per-token claimed bitmap.
//!
//! Indices are packed 64 to a word; only words with at least one claimed bit
//! are stored, so sparse index spaces stay cheap.

use std::collections::HashMap;

const WORD_BITS: u64 = u64::BITS as u64;

/// Set of claimed entitlement indices for one token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedBitmap {
    words: HashMap<u64, u64>,
}

fn locate(index: u64) -> (u64, u64) {
    (index / WORD_BITS, 1u64 << (index % WORD_BITS))
}

impl ClaimedBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self, index: u64) -> bool {
        let (word, mask) = locate(index);
        self.words.get(&word).is_some_and(|bits| bits & mask != 0)
    }

    /// Set the bit for `index`. Returns `false` if it was already set.
    pub fn set_claimed(&mut self, index: u64) -> bool {
        let (word, mask) = locate(index);
        let bits = self.words.entry(word).or_insert(0);
        if *bits & mask != 0 {
            return false;
        }
        *bits |= mask;
        true
    }

    /// Clear the bit for `index`. Only used to undo an uncommitted claim.
    pub(crate) fn clear(&mut self, index: u64) {
        let (word, mask) = locate(index);
        if let Some(bits) = self.words.get_mut(&word) {
            *bits &= !mask;
            if *bits == 0 {
                self.words.remove(&word);
            }
        }
    }

    /// Number of claimed indices.
    pub fn count(&self) -> u64 {
        self.words.values().map(|bits| bits.count_ones() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
