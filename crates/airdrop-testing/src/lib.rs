use airdrop_merkle::{Address, Hasher, Keccak256Hasher};
use rand::{rngs::StdRng, Rng, SeedableRng};

mod balance_snapshot;
mod fixture_stage;
mod gated_ledger;
mod scripted_ledger;
mod test_fixture;

pub use balance_snapshot::BalanceSnapshot;
pub use fixture_stage::FixtureStage;
pub use gated_ledger::{GatedLedger, LedgerGate};
pub use scripted_ledger::ScriptedLedger;
pub use test_fixture::TestFixture;

/// Standard test constants
pub const TEST_AMOUNT_PER_CLAIM: u128 = 1_000_000_000_000_000_000; // 1 token (18 decimals)
pub const TEST_POOL_FUNDS: u128 = 1_000_000 * TEST_AMOUNT_PER_CLAIM;

/// Allow-list shared by the scenario tests. Index 0 is the primary claimant and
/// `0x55f5...6898` appears twice (indices 2 and 5).
pub const WHITELIST: [&str; 7] = [
    "0x6cA3F330D3488A6157A88b7E3C240C40C16D1Df8",
    "0x1499b8312e6fe58b5d1164d4eccf795367c9e1d3",
    "0x55f510be6ab4c7e07ec6ee637aa83574975d6898",
    "0xcc2fe3615a45fcacc3534d53be41c6543a0a312d",
    "0xee226379db83cffc681495730c11fdde79ba4c0c",
    "0x55f510be6ab4c7e07ec6ee637aa83574975d6898",
    "0x18b2a687610328590bc8f2e5fedde3b582a49cda",
];

pub fn whitelist() -> Vec<Address> {
    WHITELIST
        .iter()
        .map(|s| {
            s.parse()
                .unwrap_or_else(|e| panic!("Bad whitelist address {s}: {e}"))
        })
        .collect()
}

/// Stable address for a named test actor: the last 20 bytes of `keccak256(identifier)`.
pub fn deterministic_address(identifier: &str) -> Address {
    let digest = Keccak256Hasher::hash(identifier.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}

/// `count` pseudo-random addresses, identical for the same seed.
pub fn random_addresses(seed: u64, count: usize) -> Vec<Address> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| Address::new(rng.gen())).collect()
}
