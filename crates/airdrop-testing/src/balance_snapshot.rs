use airdrop_merkle::Address;
use std::collections::HashMap;

use crate::TestFixture;

/// Ledger and registry state for before/after comparisons.
///
/// Two captures compare equal only if no tracked balance, the pool's balance
/// and allowance, and the claimed set are all unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub pool_balance: u128,
    pub pool_allowance: u128,
    pub claimed_count: usize,
    pub claimed_addresses: Vec<Address>,
    pub tracked_claimants: HashMap<Address, u128>,
}

impl BalanceSnapshot {
    pub fn capture(test: &TestFixture) -> Self {
        Self::capture_with_claimants(test, &[])
    }

    pub fn capture_with_claimants(test: &TestFixture, claimants: &[Address]) -> Self {
        Self {
            pool_balance: test.balance_of(&test.admin),
            pool_allowance: test.remaining_allowance(),
            claimed_count: test.service.claimed_count(),
            claimed_addresses: test.service.claimed_addresses(),
            tracked_claimants: claimants
                .iter()
                .map(|claimant| (*claimant, test.balance_of(claimant)))
                .collect(),
        }
    }

    pub fn claimant_balance(&self, claimant: &Address) -> u128 {
        self.tracked_claimants.get(claimant).copied().unwrap_or(0)
    }

    pub fn total_tracked(&self) -> u128 {
        self.tracked_claimants.values().sum()
    }
}
