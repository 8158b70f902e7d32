use rs_merkle::Hasher;

use crate::{hash_from_hex, hash_to_hex, Address, Hash, MerkleResult};

/// Fold a proof onto a leaf and return the root it implies.
///
/// At each step `acc = H(sorted(acc, sibling))`, starting from `acc = leaf`.
/// Runs in time linear in the proof length and only branches on the byte
/// comparison between `acc` and the public sibling.
pub fn compute_root<H: Hasher<Hash = Hash>>(leaf: &Hash, proof: &[Hash]) -> Hash {
    proof
        .iter()
        .fold(*leaf, |acc, sibling| H::concat_and_hash(&acc, Some(sibling)))
}

/// Verify that `leaf` is included under `root`.
pub fn verify_proof<H: Hasher<Hash = Hash>>(leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
    compute_root::<H>(leaf, proof) == *root
}

/// Verify that `address` is included under `root`.
pub fn verify_address_proof<H: Hasher<Hash = Hash>>(
    address: &Address,
    proof: &[Hash],
    root: &Hash,
) -> bool {
    verify_proof::<H>(&address.leaf::<H>(), proof, root)
}

/// Batch verify multiple proofs against the same root
pub fn batch_verify_proofs<H: Hasher<Hash = Hash>>(
    proofs: &[(Hash, &[Hash])], // (leaf, proof)
    root: &Hash,
) -> Vec<bool> {
    proofs
        .iter()
        .map(|(leaf, proof)| verify_proof::<H>(leaf, proof, root))
        .collect()
}

/// An inclusion proof as delivered by a client: sibling hashes, leaf to root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimProof(pub Vec<Hash>);

impl ClaimProof {
    pub fn new(proof: Vec<Hash>) -> Self {
        Self(proof)
    }

    /// Parse a proof from hex strings as produced by off-line tree tooling
    pub fn from_hex_strings<I, S>(hashes: I) -> MerkleResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        hashes
            .into_iter()
            .map(|s| hash_from_hex(s.as_ref()))
            .collect::<MerkleResult<Vec<_>>>()
            .map(Self)
    }

    pub fn to_hex_strings(&self) -> Vec<String> {
        self.0.iter().map(hash_to_hex).collect()
    }

    pub fn as_slice(&self) -> &[Hash] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<Hash> {
        self.0
    }

    pub fn verify<H: Hasher<Hash = Hash>>(&self, root: &Hash, address: &Address) -> bool {
        verify_address_proof::<H>(address, &self.0, root)
    }
}

impl From<Vec<Hash>> for ClaimProof {
    fn from(proof: Vec<Hash>) -> Self {
        Self(proof)
    }
}

impl AsRef<[Hash]> for ClaimProof {
    fn as_ref(&self) -> &[Hash] {
        &self.0
    }
}
