use rs_merkle::Hasher;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::hasher::strip_hex_prefix;
use crate::{Hash, MerkleError};

/// A 20-byte account identity as it appears in an allow-list.
///
/// Parsed from 40 hex characters with an optional `0x` prefix. Input is
/// case-insensitive (checksummed and lowercase forms parse to the same value);
/// output is always lowercase with the `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 20] {
        self.0
    }

    /// The Merkle leaf for this address: `H(address_bytes)`.
    pub fn leaf<H: Hasher<Hash = Hash>>(&self) -> Hash {
        H::hash(&self.0)
    }
}

/// Hash every address of an ordered allow-list into its leaf, preserving order.
pub fn leaves_for<H: Hasher<Hash = Hash>>(addresses: &[Address]) -> Vec<Hash> {
    addresses.iter().map(Address::leaf::<H>).collect()
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = strip_hex_prefix(s);

        if cleaned.len() != Self::LEN * 2 {
            return Err(MerkleError::InvalidAddress(format!(
                "expected 40 hex chars, got {} in {s:?}",
                cleaned.len()
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|e| MerkleError::InvalidAddress(format!("{s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keccak256Hasher;

    #[test]
    fn test_parse_with_and_without_prefix() {
        let with_prefix: Address = "0x1499b8312e6fe58b5d1164d4eccf795367c9e1d3".parse().unwrap();
        let without_prefix: Address = "1499b8312e6fe58b5d1164d4eccf795367c9e1d3".parse().unwrap();
        assert_eq!(with_prefix, without_prefix);
        assert_eq!(with_prefix.as_bytes()[0], 0x14);
        assert_eq!(with_prefix.as_bytes()[19], 0xd3);

        let upper_prefix: Address = "0X1499B8312E6FE58B5D1164D4ECCF795367C9E1D3".parse().unwrap();
        assert_eq!(upper_prefix, with_prefix);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let checksummed: Address = "0x6cA3F330D3488A6157A88b7E3C240C40C16D1Df8".parse().unwrap();
        let lower: Address = "0x6ca3f330d3488a6157a88b7e3c240c40c16d1df8".parse().unwrap();
        assert_eq!(checksummed, lower);
        assert_eq!(
            checksummed.leaf::<Keccak256Hasher>(),
            lower.leaf::<Keccak256Hasher>()
        );
    }

    #[test]
    fn test_display_is_lowercase_with_prefix() {
        let address: Address = "0x6cA3F330D3488A6157A88b7E3C240C40C16D1Df8".parse().unwrap();
        assert_eq!(
            address.to_string(),
            "0x6ca3f330d3488a6157a88b7e3c240c40c16d1df8"
        );
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        let result = "0x1234".parse::<Address>();
        assert!(matches!(result, Err(MerkleError::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        let result = "0xzz99b8312e6fe58b5d1164d4eccf795367c9e1d3".parse::<Address>();
        assert!(matches!(result, Err(MerkleError::InvalidAddress(_))));
    }

    #[test]
    fn test_leaf_hashes_raw_bytes() {
        let address = Address::new([7u8; 20]);
        assert_eq!(
            address.leaf::<Keccak256Hasher>(),
            Keccak256Hasher::hash(&[7u8; 20])
        );
    }

    #[test]
    fn test_leaves_for_preserves_order_and_duplicates() {
        let a = Address::new([1u8; 20]);
        let b = Address::new([2u8; 20]);
        let leaves = leaves_for::<Keccak256Hasher>(&[a, b, a]);
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0], leaves[2]);
        assert_ne!(leaves[0], leaves[1]);
    }

    #[test]
    fn test_serde_as_string() {
        let address = Address::new([0xab; 20]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
