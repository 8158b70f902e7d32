use rs_merkle::Hasher;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

use crate::{proof, tree, Address, MerkleError, MerkleResult};

/// Fixed-width digest used for leaves, internal nodes and roots.
pub type Hash = [u8; 32];

/// Hash two child nodes in sorted order: `H(min(a, b) || max(a, b))`.
///
/// Ordering the pair before concatenation is what lets a proof omit left/right
/// positions: the parent is the same whichever side each child came from.
pub fn hash_sorted_pair<H: Hasher<Hash = Hash>>(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo);
    buf[32..].copy_from_slice(hi);
    H::hash(&buf)
}

/// Keccak-256 tree hasher, the default for airdrop campaigns.
///
/// - **Leaf nodes**: `Keccak256(address_bytes)`, no prefix
/// - **Internal nodes**: `Keccak256(sorted(left, right))`
/// - **Unpaired node**: propagated unchanged
///
/// Roots and proofs built with this hasher match the widely used sorted-pair
/// keccak tooling, so proofs produced off-line by that tooling verify here.
#[derive(Clone, Debug, Default)]
pub struct Keccak256Hasher;

impl Hasher for Keccak256Hasher {
    type Hash = Hash;

    fn hash(data: &[u8]) -> Hash {
        Keccak256::digest(data).into()
    }

    fn concat_and_hash(left: &Self::Hash, right: Option<&Self::Hash>) -> Self::Hash {
        match right {
            Some(right_hash) => hash_sorted_pair::<Self>(left, right_hash),
            // No sibling at this level, so the node moves up as-is
            None => *left,
        }
    }
}

/// SHA-256 tree hasher with the same sorted-pair and promotion rules.
#[derive(Clone, Debug, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    type Hash = Hash;

    fn hash(data: &[u8]) -> Hash {
        Sha256::digest(data).into()
    }

    fn concat_and_hash(left: &Self::Hash, right: Option<&Self::Hash>) -> Self::Hash {
        match right {
            Some(right_hash) => hash_sorted_pair::<Self>(left, right_hash),
            None => *left,
        }
    }
}

/// Hash function selected for a campaign at runtime.
///
/// Serialized as `"keccak256"` or `"sha256"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Keccak256,
    Sha256,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Keccak256 => "keccak256",
            HashAlgorithm::Sha256 => "sha256",
        }
    }

    pub fn hash(&self, data: &[u8]) -> Hash {
        match self {
            HashAlgorithm::Keccak256 => Keccak256Hasher::hash(data),
            HashAlgorithm::Sha256 => Sha256Hasher::hash(data),
        }
    }

    pub fn hash_pair(&self, a: &Hash, b: &Hash) -> Hash {
        match self {
            HashAlgorithm::Keccak256 => hash_sorted_pair::<Keccak256Hasher>(a, b),
            HashAlgorithm::Sha256 => hash_sorted_pair::<Sha256Hasher>(a, b),
        }
    }

    pub fn leaf(&self, address: &Address) -> Hash {
        self.hash(address.as_bytes())
    }

    pub fn leaves(&self, addresses: &[Address]) -> Vec<Hash> {
        addresses.iter().map(|address| self.leaf(address)).collect()
    }

    /// Root of an empty allow-list: the hash of the empty byte string.
    pub fn empty_root(&self) -> Hash {
        self.hash(&[])
    }

    pub fn build_root(&self, leaves: &[Hash]) -> Hash {
        match self {
            HashAlgorithm::Keccak256 => tree::build_root::<Keccak256Hasher>(leaves),
            HashAlgorithm::Sha256 => tree::build_root::<Sha256Hasher>(leaves),
        }
    }

    pub fn generate_proof(&self, leaves: &[Hash], index: usize) -> MerkleResult<Vec<Hash>> {
        match self {
            HashAlgorithm::Keccak256 => tree::generate_proof::<Keccak256Hasher>(leaves, index),
            HashAlgorithm::Sha256 => tree::generate_proof::<Sha256Hasher>(leaves, index),
        }
    }

    pub fn verify_proof(&self, leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
        match self {
            HashAlgorithm::Keccak256 => proof::verify_proof::<Keccak256Hasher>(leaf, proof, root),
            HashAlgorithm::Sha256 => proof::verify_proof::<Sha256Hasher>(leaf, proof, root),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keccak256" | "keccak-256" | "keccak" => Ok(HashAlgorithm::Keccak256),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(MerkleError::UnknownHashAlgorithm(other.to_string())),
        }
    }
}

/// Render a hash as `0x`-prefixed lowercase hex.
pub fn hash_to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Trim whitespace and drop an optional `0x`/`0X` prefix.
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Parse a 32-byte hash from hex, with or without the `0x` prefix.
pub fn hash_from_hex(s: &str) -> MerkleResult<Hash> {
    let cleaned = strip_hex_prefix(s);
    let bytes = hex::decode(cleaned).map_err(|e| MerkleError::InvalidHash(format!("{s:?}: {e}")))?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        MerkleError::InvalidHash(format!("expected 32 bytes, got {}", bytes.len()))
    })
}
