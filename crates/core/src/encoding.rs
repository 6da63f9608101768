//! Hex and decimal helpers for addresses, hashes and amounts.
//!
//! Every serialized artifact (distribution files, CLI output, config)
//! carries hashes and addresses as `0x`-prefixed lowercase hex and amounts
//! as decimal strings.

use crate::{Address, Amount, CoreError, Hash, Result};

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes.as_ref()))
}

fn parse_fixed<const N: usize>(input: &str) -> Result<[u8; N]> {
    let trimmed = input.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != N * 2 {
        return Err(CoreError::InvalidLength {
            expected: N,
            actual: cleaned.len() / 2,
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(cleaned, &mut out).map_err(|e| CoreError::InvalidHex(e.to_string()))?;
    Ok(out)
}

/// Parse a 20-byte account address, with or without the `0x` prefix.
pub fn parse_address(input: &str) -> Result<Address> {
    parse_fixed::<20>(input)
}

/// Parse a 32-byte hash, with or without the `0x` prefix.
pub fn parse_hash(input: &str) -> Result<Hash> {
    parse_fixed::<32>(input)
}

/// Parse an amount from a decimal string, or hex when prefixed with `0x`.
pub fn parse_amount(input: &str) -> Result<Amount> {
    let trimmed = input.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(digits) => Amount::from_str_radix(digits, 16).map_err(|e| e.to_string()),
        None => Amount::from_dec_str(trimmed).map_err(|e| format!("{e:?}")),
    };
    parsed.map_err(|e| CoreError::InvalidAmount(format!("{trimmed}: {e}")))
}

/// Serde adapter for [`Address`] as a hex string.
pub mod serde_address {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::Address;

    pub fn serialize<S: Serializer>(value: &Address, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::hex_encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_address(&raw).map_err(D::Error::custom)
    }
}

/// Serde adapter for [`Hash`] as a hex string.
pub mod serde_hash {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::Hash;

    pub fn serialize<S: Serializer>(value: &Hash, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::hex_encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Hash, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_hash(&raw).map_err(D::Error::custom)
    }

    /// Same encoding for an ordered list of hashes (Merkle proofs).
    pub mod list {
        use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

        use crate::Hash;

        pub fn serialize<S: Serializer>(values: &[Hash], s: S) -> Result<S::Ok, S::Error> {
            let mut seq = s.serialize_seq(Some(values.len()))?;
            for value in values {
                seq.serialize_element(&crate::hex_encode(value))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Hash>, D::Error> {
            let raw = Vec::<String>::deserialize(d)?;
            raw.iter()
                .map(|h| crate::parse_hash(h).map_err(D::Error::custom))
                .collect()
        }
    }
}

/// Serde adapter for [`Amount`] as a decimal string.
///
/// Accepts a JSON number on input as well, for hand-written entitlement
/// lists with small amounts.
pub mod serde_amount {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::Amount;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &Amount, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Amount, D::Error> {
        match RawAmount::deserialize(d)? {
            RawAmount::Text(text) => super::parse_amount(&text).map_err(D::Error::custom),
            RawAmount::Number(n) => Ok(Amount::from(n)),
        }
    }
}
