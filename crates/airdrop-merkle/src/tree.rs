use rs_merkle::{Hasher, MerkleTree};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::{hash_to_hex, leaves_for, proof, Address, Hash, MerkleError, MerkleResult};

/// Root of an empty allow-list: `H("")`.
pub fn empty_root<H: Hasher<Hash = Hash>>() -> Hash {
    H::hash(&[])
}

/// Compute the root over an ordered leaf sequence.
pub fn build_root<H: Hasher<Hash = Hash>>(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return empty_root::<H>();
    }

    MerkleTree::<H>::from_leaves(leaves)
        .root()
        .unwrap_or_else(empty_root::<H>)
}

/// Sibling hashes for `leaves[index]`, ordered from the leaf level up to (not
/// including) the root. Levels where the node was promoted contribute nothing.
pub fn generate_proof<H: Hasher<Hash = Hash>>(
    leaves: &[Hash],
    index: usize,
) -> MerkleResult<Vec<Hash>> {
    if index >= leaves.len() {
        return Err(MerkleError::LeafIndexOutOfBounds {
            index,
            leaf_count: leaves.len(),
        });
    }

    let tree = MerkleTree::<H>::from_leaves(leaves);
    Ok(tree.proof(&[index]).proof_hashes().to_vec())
}

/// A Merkle tree built over an ordered allow-list
#[derive(Clone)]
pub struct AllowListTree<H: Hasher<Hash = Hash>> {
    /// The underlying merkle tree
    tree: MerkleTree<H>,
    /// Leaf hashes in allow-list order
    leaves: Vec<Hash>,
    /// First position of each address in the allow-list
    address_to_index: HashMap<Address, usize>,
}

impl<H: Hasher<Hash = Hash>> AllowListTree<H> {
    /// Build a tree over an ordered allow-list.
    ///
    /// Duplicate addresses produce duplicate leaves. Proof lookups by address
    /// use the first occurrence; a proof for any occurrence verifies.
    pub fn from_addresses(addresses: &[Address]) -> Self {
        let mut address_to_index = HashMap::with_capacity(addresses.len());
        for (index, address) in addresses.iter().enumerate() {
            address_to_index.entry(*address).or_insert(index);
        }

        let mut tree = Self::from_leaves(leaves_for::<H>(addresses));
        tree.address_to_index = address_to_index;
        tree
    }

    /// Build a tree over precomputed leaf hashes. Address lookups are unavailable.
    pub fn from_leaves(leaves: Vec<Hash>) -> Self {
        let tree = MerkleTree::<H>::from_leaves(&leaves);

        let built = Self {
            tree,
            leaves,
            address_to_index: HashMap::new(),
        };
        debug!(
            "Built allow-list tree: {} leaves, depth {}, root {}",
            built.len(),
            built.depth(),
            hash_to_hex(&built.root())
        );
        built
    }

    pub fn root(&self) -> Hash {
        if self.leaves.is_empty() {
            return empty_root::<H>();
        }
        self.tree.root().unwrap_or_else(empty_root::<H>)
    }

    pub fn root_hex(&self) -> String {
        hash_to_hex(&self.root())
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Number of levels above the leaves
    pub fn depth(&self) -> usize {
        if self.leaves.is_empty() {
            0
        } else {
            self.tree.depth()
        }
    }

    pub fn leaves(&self) -> &[Hash] {
        &self.leaves
    }

    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.address_to_index.get(address).copied()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.address_to_index.contains_key(address)
    }

    /// Generate the proof for the leaf at `index`
    pub fn proof(&self, index: usize) -> MerkleResult<Vec<Hash>> {
        if index >= self.leaves.len() {
            return Err(MerkleError::LeafIndexOutOfBounds {
                index,
                leaf_count: self.leaves.len(),
            });
        }

        Ok(self.tree.proof(&[index]).proof_hashes().to_vec())
    }

    /// Generate the proof for an allow-listed address
    pub fn proof_for_address(&self, address: &Address) -> MerkleResult<Vec<Hash>> {
        let index = self
            .index_of(address)
            .ok_or(MerkleError::AddressNotFound(*address))?;
        self.proof(index)
    }

    /// Generate proofs for multiple addresses
    pub fn proofs_for_addresses(
        &self,
        addresses: &[Address],
    ) -> MerkleResult<HashMap<Address, Vec<Hash>>> {
        let mut proofs = HashMap::with_capacity(addresses.len());

        for address in addresses {
            let proof = self.proof_for_address(address)?;
            proofs.insert(*address, proof);
        }

        Ok(proofs)
    }

    /// Verify a proof for a leaf against this tree's root
    pub fn verify(&self, leaf: &Hash, proof: &[Hash]) -> bool {
        proof::verify_proof::<H>(leaf, proof, &self.root())
    }
}

impl<H: Hasher<Hash = Hash>> fmt::Debug for AllowListTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllowListTree")
            .field("root", &self.root_hex())
            .field("leaves", &self.leaves.len())
            .field("depth", &self.depth())
            .finish()
    }
}
