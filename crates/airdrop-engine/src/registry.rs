use airdrop_merkle::Address;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::serde_helpers::u128_string;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("address has already claimed: {0}")]
    AlreadyClaimed(Address),

    #[error("claim sequence {0} leaves no room for further claims")]
    SequenceExhausted(u64),
}

/// Proof that an address has claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// The claimant who received the tokens.
    pub address: Address,

    /// Base units transferred to the claimant.
    #[serde(with = "u128_string")]
    pub amount: u128,

    /// Position of this claim in the campaign, starting at 1. Strictly increasing;
    /// a claim rolled back after a failed transfer leaves a gap.
    pub sequence: u64,
}

#[derive(Debug)]
struct RegistryState {
    records: HashMap<Address, ClaimRecord>,
    next_sequence: u64,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            next_sequence: 1,
        }
    }
}

/// Per-address claim state: `Unclaimed --mark_claimed--> Claimed`.
///
/// `Claimed` is terminal for callers. The only way back is the crate-internal
/// rollback used when the token transfer of the same claim fails.
#[derive(Debug, Default)]
pub struct ClaimRegistry {
    state: RwLock<RegistryState>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted records.
    pub fn from_records<I>(records: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = ClaimRecord>,
    {
        let mut state = RegistryState::default();

        for record in records {
            if state.records.insert(record.address, record).is_some() {
                return Err(RegistryError::AlreadyClaimed(record.address));
            }
            let after = record
                .sequence
                .checked_add(1)
                .ok_or(RegistryError::SequenceExhausted(record.sequence))?;
            state.next_sequence = state.next_sequence.max(after);
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    pub fn is_claimed(&self, address: &Address) -> bool {
        self.state.read().records.contains_key(address)
    }

    /// Atomically check and set the claimed flag for `address`.
    ///
    /// The last `u64` sequence is never handed out, so every stored record can
    /// be restored with room for the next one.
    pub fn mark_claimed(&self, address: &Address, amount: u128) -> RegistryResult<ClaimRecord> {
        let mut state = self.state.write();

        if state.records.contains_key(address) {
            return Err(RegistryError::AlreadyClaimed(*address));
        }

        let sequence = state.next_sequence;
        state.next_sequence = sequence
            .checked_add(1)
            .ok_or(RegistryError::SequenceExhausted(sequence))?;

        let record = ClaimRecord {
            address: *address,
            amount,
            sequence,
        };
        state.records.insert(*address, record);
        Ok(record)
    }

    /// Undo a mark whose transfer failed. Callers must hold the address's claim lock.
    pub(crate) fn revert_claim(&self, address: &Address) -> Option<ClaimRecord> {
        self.state.write().records.remove(address)
    }

    pub fn record(&self, address: &Address) -> Option<ClaimRecord> {
        self.state.read().records.get(address).copied()
    }

    pub fn claimed_count(&self) -> usize {
        self.state.read().records.len()
    }

    /// All records in claim order
    pub fn records(&self) -> Vec<ClaimRecord> {
        let mut records: Vec<ClaimRecord> = self.state.read().records.values().copied().collect();
        records.sort_by_key(|record| record.sequence);
        records
    }

    /// Claimed addresses in ascending byte order
    pub fn claimed_addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.state.read().records.keys().copied().collect();
        addresses.sort();
        addresses
    }
}
