use thiserror::Error;

use crate::Address;

pub type MerkleResult<T> = Result<T, MerkleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Leaf index {index} is out of bounds for tree with {leaf_count} leaves")]
    LeafIndexOutOfBounds { index: usize, leaf_count: usize },

    #[error("Address not found in allow-list: {0}")]
    AddressNotFound(Address),

    #[error("Unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),
}
