/*!
# Airdrop Claim Engine

Exactly-once token claims against a published Merkle root.

## Claim Flow

1. Hash the claimant's address into a leaf
2. Fold the supplied proof onto the leaf and compare with the root
3. Under the claimant's lock, refuse if already claimed, otherwise mark claimed
4. Transfer the fixed amount from the pool; undo the mark if the transfer fails
5. Publish a [`ClaimEvent`]

## Usage

```rust
use airdrop_engine::{AirdropService, InMemoryTokenLedger, ServiceConfig, TokenLedger};
use airdrop_merkle::{Address, AllowListTree, Keccak256Hasher};
use std::sync::Arc;

# fn example() -> Result<(), Box<dyn std::error::Error>> {
let admin: Address = "0x00000000000000000000000000000000000000ad".parse()?;
let pool: Address = "0x00000000000000000000000000000000000000ff".parse()?;
let alice: Address = "0x6ca3f330d3488a6157a88b7e3c240c40c16d1df8".parse()?;
let bob: Address = "0x1499b8312e6fe58b5d1164d4eccf795367c9e1d3".parse()?;

let tree = AllowListTree::<Keccak256Hasher>::from_addresses(&[alice, bob]);

let ledger = Arc::new(InMemoryTokenLedger::new());
ledger.mint(&pool, 10_000_000_000_000_000_000)?;

let service = AirdropService::new(ServiceConfig::new(pool));
service.initialize(admin, ledger.clone(), tree.root())?;

let proof = tree.proof_for_address(&alice)?;
service.claim(&alice, &proof)?;
assert_eq!(ledger.balance_of(&alice), 1_000_000_000_000_000_000);
# Ok(())
# }
```
*/

pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod registry;
pub mod serde_helpers;
pub mod service;
pub mod snapshot;

pub use config::{CampaignConfig, ConfigError, ConfigResult};
pub use error::{AirdropError, AirdropResult, ClaimFailure};
pub use event::ClaimEvent;
pub use ledger::{InMemoryTokenLedger, LedgerError, LedgerResult, SpenderLedger, TokenLedger};
pub use registry::{ClaimRecord, ClaimRegistry, RegistryError, RegistryResult};
pub use service::{AirdropService, ServiceConfig, DEFAULT_AMOUNT_PER_CLAIM, DEFAULT_EVENT_CAPACITY};
pub use snapshot::{CampaignSnapshot, SnapshotError, SnapshotResult};
