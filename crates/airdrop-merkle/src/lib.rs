/*!
# Airdrop Merkle Trees

Sorted-pair binary Merkle trees over allow-listed addresses.

## Tree Shape

- **Leaves**: `H(address_bytes)` over the 20 raw address bytes
- **Internal nodes**: `H(min(left, right) || max(left, right))`
- **Unpaired nodes**: promoted unchanged to the next level
- **Empty tree**: the root is `H("")`, which no leaf can reach

Because children are ordered before hashing, a proof is just the list of sibling
hashes from leaf to root. No left/right position travels with it.

## Usage

```rust
use airdrop_merkle::{verify_proof, Address, AllowListTree, Keccak256Hasher};

# fn example() -> airdrop_merkle::MerkleResult<()> {
let allow_list: Vec<Address> = [
    "0x6cA3F330D3488A6157A88b7E3C240C40C16D1Df8",
    "0x1499b8312e6fe58b5d1164d4eccf795367c9e1d3",
    "0x55f510be6ab4c7e07ec6ee637aa83574975d6898",
]
.iter()
.map(|s| s.parse())
.collect::<Result<_, _>>()?;

let tree = AllowListTree::<Keccak256Hasher>::from_addresses(&allow_list);
let proof = tree.proof_for_address(&allow_list[0])?;

let leaf = allow_list[0].leaf::<Keccak256Hasher>();
assert!(verify_proof::<Keccak256Hasher>(&leaf, &proof, &tree.root()));
# Ok(())
# }
```
*/

pub mod address;
pub mod error;
pub mod hasher;
pub mod proof;
pub mod tree;

pub use address::{leaves_for, Address};
pub use error::{MerkleError, MerkleResult};
pub use hasher::{
    hash_from_hex, hash_sorted_pair, hash_to_hex, Hash, HashAlgorithm, Keccak256Hasher,
    Sha256Hasher,
};
pub use proof::{batch_verify_proofs, compute_root, verify_address_proof, verify_proof, ClaimProof};
pub use tree::{build_root, empty_root, generate_proof, AllowListTree};

// Re-export the hasher trait so callers can name tree parameters
pub use rs_merkle::Hasher;
