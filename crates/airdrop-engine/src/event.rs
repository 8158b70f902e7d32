use airdrop_merkle::{Address, Hash};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::{hex_hash, u128_string};

/// Published after a claim's transfer succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub claimant: Address,

    #[serde(with = "u128_string")]
    pub amount: u128,

    /// Root of the campaign the claim was proven against
    #[serde(with = "hex_hash")]
    pub root: Hash,

    pub sequence: u64,
}
