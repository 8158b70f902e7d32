use airdrop_merkle::{hash_to_hex, Address, Hash, HashAlgorithm};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{AirdropError, AirdropResult, ClaimFailure};
use crate::event::ClaimEvent;
use crate::ledger::TokenLedger;
use crate::registry::{ClaimRecord, ClaimRegistry, RegistryError};
use crate::snapshot::CampaignSnapshot;

/// One whole token at 18 decimals
pub const DEFAULT_AMOUNT_PER_CLAIM: u128 = 1_000_000_000_000_000_000;

pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Fixed parameters of a campaign, known before its root is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Account the claimed tokens are paid from
    pub pool: Address,

    /// Base units paid to every successful claimant
    pub amount_per_claim: u128,

    /// Hash used for leaves, internal nodes and verification
    pub hash_algorithm: HashAlgorithm,

    /// Buffered [`ClaimEvent`]s per subscriber before the slowest one lags
    pub event_capacity: usize,
}

impl ServiceConfig {
    pub fn new(pool: Address) -> Self {
        Self {
            pool,
            amount_per_claim: DEFAULT_AMOUNT_PER_CLAIM,
            hash_algorithm: HashAlgorithm::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_amount_per_claim(mut self, amount_per_claim: u128) -> Self {
        self.amount_per_claim = amount_per_claim;
        self
    }

    pub fn with_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = hash_algorithm;
        self
    }

    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }
}

/// State fixed by `initialize`
struct Campaign {
    admin: Address,
    root: Hash,
    ledger: Arc<dyn TokenLedger>,
}

/// Exactly-once claim engine for one campaign.
///
/// Lifecycle: created uninitialized, `initialize` publishes the root once, then
/// any number of concurrent `claim` calls. Claims for the same address are
/// serialized by a per-address lock held from the claimed check through the
/// transfer (and rollback if the transfer fails). Different addresses never
/// wait on each other beyond the registry's own short write lock.
///
/// Reads of the whole claim set (`snapshot`, `claim_records`, ...) only see
/// settled claims: they wait until every in-flight claim is either paid or
/// rolled back.
pub struct AirdropService {
    config: ServiceConfig,
    campaign: OnceLock<Campaign>,
    registry: ClaimRegistry,
    claim_locks: Mutex<HashMap<Address, Arc<Mutex<()>>>>,
    /// Read-held by each claim from mark to commit or rollback
    in_flight: RwLock<()>,
    events: broadcast::Sender<ClaimEvent>,
}

impl AirdropService {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_registry(config, ClaimRegistry::new())
    }

    fn with_registry(config: ServiceConfig, registry: ClaimRegistry) -> Self {
        // broadcast::channel panics on zero capacity
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            config,
            campaign: OnceLock::new(),
            registry,
            claim_locks: Mutex::new(HashMap::new()),
            in_flight: RwLock::new(()),
            events,
        }
    }

    /// Resume a campaign from a persisted snapshot.
    ///
    /// The returned service is already initialized with the snapshot's root and
    /// admin, and every recorded claim stays claimed.
    pub fn restore(snapshot: &CampaignSnapshot, ledger: Arc<dyn TokenLedger>) -> AirdropResult<Self> {
        snapshot.validate()?;

        let registry = ClaimRegistry::from_records(snapshot.claims.iter().copied())
            .map_err(|e| AirdropError::InvalidSnapshot(e.to_string()))?;

        let service = Self::with_registry(snapshot.service_config(), registry);
        service.initialize(snapshot.admin, ledger, snapshot.root)?;

        info!(
            "Restored campaign {} with {} recorded claims",
            hash_to_hex(&snapshot.root),
            snapshot.claims.len()
        );
        Ok(service)
    }

    /// Publish the campaign root. Allowed exactly once.
    pub fn initialize(
        &self,
        admin: Address,
        ledger: Arc<dyn TokenLedger>,
        root: Hash,
    ) -> AirdropResult<()> {
        self.campaign
            .set(Campaign {
                admin,
                root,
                ledger,
            })
            .map_err(|_| {
                warn!("Rejected second initialize from {}", admin);
                AirdropError::AlreadyInitialized
            })?;

        info!(
            "Initialized campaign root={} admin={} pool={} amount_per_claim={} hash={}",
            hash_to_hex(&root),
            admin,
            self.config.pool,
            self.config.amount_per_claim,
            self.config.hash_algorithm
        );
        Ok(())
    }

    /// Claim the fixed allocation for `claimant`, returning the amount paid.
    pub fn claim(&self, claimant: &Address, proof: &[Hash]) -> AirdropResult<u128> {
        let campaign = self.campaign.get().ok_or(AirdropError::NotInitialized)?;
        let amount = self.config.amount_per_claim;

        // 1. Leaf and proof check; touches no state
        let leaf = self.config.hash_algorithm.leaf(claimant);
        if !self
            .config
            .hash_algorithm
            .verify_proof(&leaf, proof, &campaign.root)
        {
            warn!(
                "Rejected claim from {}: proof of {} hashes does not reach root",
                claimant,
                proof.len()
            );
            return Err(AirdropError::ClaimFailed {
                claimant: *claimant,
                reason: ClaimFailure::InvalidProof,
            });
        }
        debug!("Proof verified for {}", claimant);

        // 2. Everything from here to the end runs under the claimant's lock
        let lock = self.claim_lock(claimant);
        let _guard = lock.lock();
        let in_flight = self.in_flight.read();

        if self.registry.is_claimed(claimant) {
            warn!("Rejected repeat claim from {}", claimant);
            return Err(AirdropError::AlreadyClaimed {
                claimant: *claimant,
            });
        }

        // 3. Mark before paying so a concurrent path can never pay twice
        let record = self
            .registry
            .mark_claimed(claimant, amount)
            .map_err(|err| match err {
                RegistryError::AlreadyClaimed(_) => AirdropError::AlreadyClaimed {
                    claimant: *claimant,
                },
                RegistryError::SequenceExhausted(_) => {
                    warn!("Rejected claim from {}: {}", claimant, err);
                    AirdropError::ClaimFailed {
                        claimant: *claimant,
                        reason: ClaimFailure::SequenceExhausted,
                    }
                }
            })?;

        // 4. Pay, or undo the mark
        if let Err(err) = campaign.ledger.transfer(&self.config.pool, claimant, amount) {
            self.registry.revert_claim(claimant);
            warn!(
                "Rolled back claim #{} for {}: transfer failed: {}",
                record.sequence, claimant, err
            );
            return Err(AirdropError::from_ledger(*claimant, err));
        }
        drop(in_flight);

        info!(
            "Claim #{}: {} received {} from pool {}",
            record.sequence, claimant, amount, self.config.pool
        );

        // No subscribers is not an error
        let _ = self.events.send(ClaimEvent {
            claimant: *claimant,
            amount,
            root: campaign.root,
            sequence: record.sequence,
        });

        Ok(amount)
    }

    fn claim_lock(&self, claimant: &Address) -> Arc<Mutex<()>> {
        let mut locks = self.claim_locks.lock();
        Arc::clone(locks.entry(*claimant).or_default())
    }

    pub fn is_initialized(&self) -> bool {
        self.campaign.get().is_some()
    }

    pub fn root(&self) -> Option<Hash> {
        self.campaign.get().map(|c| c.root)
    }

    pub fn admin(&self) -> Option<Address> {
        self.campaign.get().map(|c| c.admin)
    }

    pub fn pool(&self) -> Address {
        self.config.pool
    }

    pub fn amount_per_claim(&self) -> u128 {
        self.config.amount_per_claim
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.config.hash_algorithm
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Whether `address` has claimed. A claim whose transfer is still running
    /// counts until it is rolled back.
    pub fn is_claimed(&self, address: &Address) -> bool {
        self.registry.is_claimed(address)
    }

    pub fn claim_record(&self, address: &Address) -> Option<ClaimRecord> {
        self.registry.record(address)
    }

    /// Settled claims in sequence order
    pub fn claim_records(&self) -> Vec<ClaimRecord> {
        let _settled = self.in_flight.write();
        self.registry.records()
    }

    /// Settled claimants in ascending byte order
    pub fn claimed_addresses(&self) -> Vec<Address> {
        let _settled = self.in_flight.write();
        self.registry.claimed_addresses()
    }

    pub fn claimed_count(&self) -> usize {
        let _settled = self.in_flight.write();
        self.registry.claimed_count()
    }

    /// Receive a [`ClaimEvent`] for every claim that succeeds after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ClaimEvent> {
        self.events.subscribe()
    }

    /// Capture the persisted state of an initialized campaign.
    ///
    /// Waits for in-flight claims, so a claim whose transfer later fails is
    /// never persisted.
    pub fn snapshot(&self) -> AirdropResult<CampaignSnapshot> {
        let campaign = self.campaign.get().ok_or(AirdropError::NotInitialized)?;
        let _settled = self.in_flight.write();

        Ok(CampaignSnapshot {
            root: campaign.root,
            admin: campaign.admin,
            pool: self.config.pool,
            amount_per_claim: self.config.amount_per_claim,
            hash_algorithm: self.config.hash_algorithm,
            claims: self.registry.records(),
        })
    }
}

impl fmt::Debug for AirdropService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirdropService")
            .field("config", &self.config)
            .field("root", &self.root().map(|root| hash_to_hex(&root)))
            .field("admin", &self.admin())
            .field("claimed", &self.registry.claimed_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryTokenLedger, LedgerError, LedgerResult};
    use airdrop_merkle::{AllowListTree, Keccak256Hasher, Sha256Hasher};
    use tokio::sync::broadcast::error::TryRecvError;

    fn addr(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    fn admin() -> Address {
        addr(0xAD)
    }

    fn pool() -> Address {
        addr(0xFF)
    }

    fn allow_list() -> Vec<Address> {
        (1..=5).map(addr).collect()
    }

    fn funded_ledger(amount: u128) -> Arc<InMemoryTokenLedger> {
        let ledger = Arc::new(InMemoryTokenLedger::new());
        ledger.mint(&pool(), amount).unwrap();
        ledger
    }

    fn setup(pool_funds: u128) -> (AirdropService, Arc<InMemoryTokenLedger>, AllowListTree<Keccak256Hasher>) {
        let tree = AllowListTree::<Keccak256Hasher>::from_addresses(&allow_list());
        let ledger = funded_ledger(pool_funds);
        let service = AirdropService::new(ServiceConfig::new(pool()).with_amount_per_claim(100));
        service
            .initialize(admin(), ledger.clone(), tree.root())
            .unwrap();
        (service, ledger, tree)
    }

    /// Fails every transfer with the configured error
    struct RejectingLedger(LedgerError);

    impl TokenLedger for RejectingLedger {
        fn transfer(&self, _: &Address, _: &Address, _: u128) -> LedgerResult<()> {
            Err(self.0.clone())
        }

        fn balance_of(&self, _: &Address) -> u128 {
            0
        }
    }

    #[test]
    fn test_claim_before_initialize() {
        let service = AirdropService::new(ServiceConfig::new(pool()));
        assert!(!service.is_initialized());
        assert_eq!(service.claim(&addr(1), &[]), Err(AirdropError::NotInitialized));
        assert_eq!(service.snapshot().unwrap_err(), AirdropError::NotInitialized);
    }

    #[test]
    fn test_initialize_once() {
        let (service, ledger, tree) = setup(1_000);
        assert_eq!(service.root(), Some(tree.root()));
        assert_eq!(service.admin(), Some(admin()));

        let result = service.initialize(addr(9), ledger, [7u8; 32]);
        assert_eq!(result, Err(AirdropError::AlreadyInitialized));
        assert_eq!(service.root(), Some(tree.root()));
        assert_eq!(service.admin(), Some(admin()));
    }

    #[test]
    fn test_claim_pays_and_records() {
        let (service, ledger, tree) = setup(1_000);
        let claimant = addr(3);
        let proof = tree.proof_for_address(&claimant).unwrap();

        assert_eq!(service.claim(&claimant, &proof), Ok(100));
        assert!(service.is_claimed(&claimant));
        assert_eq!(ledger.balance_of(&claimant), 100);
        assert_eq!(ledger.balance_of(&pool()), 900);
        assert_eq!(service.claim_record(&claimant).unwrap().sequence, 1);
    }

    #[test]
    fn test_repeat_claim_rejected() {
        let (service, ledger, tree) = setup(1_000);
        let claimant = addr(1);
        let proof = tree.proof_for_address(&claimant).unwrap();

        service.claim(&claimant, &proof).unwrap();
        assert_eq!(
            service.claim(&claimant, &proof),
            Err(AirdropError::AlreadyClaimed { claimant })
        );
        assert_eq!(ledger.balance_of(&claimant), 100);
    }

    #[test]
    fn test_bad_proof_checked_before_claimed_flag() {
        let (service, _ledger, tree) = setup(1_000);
        let claimant = addr(1);
        service
            .claim(&claimant, &tree.proof_for_address(&claimant).unwrap())
            .unwrap();

        let wrong = tree.proof_for_address(&addr(2)).unwrap();
        assert!(matches!(
            service.claim(&claimant, &wrong),
            Err(AirdropError::ClaimFailed {
                reason: ClaimFailure::InvalidProof,
                ..
            })
        ));
    }

    #[test]
    fn test_unlisted_address_rejected() {
        let (service, ledger, _tree) = setup(1_000);
        let outsider = addr(42);

        assert!(matches!(
            service.claim(&outsider, &[]),
            Err(AirdropError::ClaimFailed { .. })
        ));
        assert!(!service.is_claimed(&outsider));
        assert_eq!(ledger.balance_of(&pool()), 1_000);
    }

    #[test]
    fn test_insufficient_pool_rolls_back() {
        let (service, ledger, tree) = setup(150);
        let first = addr(1);
        let second = addr(2);

        service
            .claim(&first, &tree.proof_for_address(&first).unwrap())
            .unwrap();

        let proof = tree.proof_for_address(&second).unwrap();
        let err = service.claim(&second, &proof).unwrap_err();
        assert_eq!(
            err,
            AirdropError::InsufficientBalance {
                required: 100,
                available: 50
            }
        );
        assert!(err.is_retryable());
        assert!(!service.is_claimed(&second));

        // Top up and retry the same claim
        ledger.mint(&pool(), 50).unwrap();
        assert_eq!(service.claim(&second, &proof), Ok(100));
        assert_eq!(service.claim_record(&second).unwrap().sequence, 3);
    }

    #[test]
    fn test_ledger_timeout_rolls_back() {
        let tree = AllowListTree::<Keccak256Hasher>::from_addresses(&allow_list());
        let service = AirdropService::new(ServiceConfig::new(pool()));
        service
            .initialize(admin(), Arc::new(RejectingLedger(LedgerError::Timeout)), tree.root())
            .unwrap();

        let claimant = addr(4);
        let result = service.claim(&claimant, &tree.proof_for_address(&claimant).unwrap());
        assert_eq!(
            result,
            Err(AirdropError::ClaimFailed {
                claimant,
                reason: ClaimFailure::LedgerTimeout
            })
        );
        assert!(!service.is_claimed(&claimant));
        assert_eq!(service.claimed_count(), 0);
    }

    #[test]
    fn test_events_follow_successful_claims() {
        let (service, _ledger, tree) = setup(1_000);
        let mut events = service.subscribe();

        let claimant = addr(5);
        service.claim(&claimant, &[]).unwrap_err();
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

        service
            .claim(&claimant, &tree.proof_for_address(&claimant).unwrap())
            .unwrap();
        assert_eq!(
            events.try_recv(),
            Ok(ClaimEvent {
                claimant,
                amount: 100,
                root: tree.root(),
                sequence: 1,
            })
        );
    }

    #[test]
    fn test_sha256_campaign() {
        let tree = AllowListTree::<Sha256Hasher>::from_addresses(&allow_list());
        let ledger = funded_ledger(1_000);
        let config = ServiceConfig::new(pool())
            .with_amount_per_claim(10)
            .with_hash_algorithm(HashAlgorithm::Sha256);
        let service = AirdropService::new(config);
        service.initialize(admin(), ledger, tree.root()).unwrap();

        let claimant = addr(2);
        assert_eq!(
            service.claim(&claimant, &tree.proof_for_address(&claimant).unwrap()),
            Ok(10)
        );
    }

    #[test]
    fn test_snapshot_and_restore() {
        let (service, ledger, tree) = setup(1_000);
        for claimant in [addr(2), addr(4)] {
            service
                .claim(&claimant, &tree.proof_for_address(&claimant).unwrap())
                .unwrap();
        }

        let snapshot = service.snapshot().unwrap();
        assert_eq!(snapshot.claims.len(), 2);

        let restored = AirdropService::restore(&snapshot, ledger.clone()).unwrap();
        assert_eq!(restored.root(), Some(tree.root()));
        assert!(restored.is_claimed(&addr(2)));
        assert!(restored.is_claimed(&addr(4)));
        assert_eq!(
            restored.claim(&addr(2), &tree.proof_for_address(&addr(2)).unwrap()),
            Err(AirdropError::AlreadyClaimed { claimant: addr(2) })
        );

        restored
            .claim(&addr(1), &tree.proof_for_address(&addr(1)).unwrap())
            .unwrap();
        assert_eq!(restored.claim_record(&addr(1)).unwrap().sequence, 3);
        assert_eq!(ledger.balance_of(&pool()), 700);
    }

    #[test]
    fn test_exhausted_sequence_fails_without_paying() {
        let (service, ledger, tree) = setup(1_000);
        service
            .claim(&addr(1), &tree.proof_for_address(&addr(1)).unwrap())
            .unwrap();

        let mut snapshot = service.snapshot().unwrap();
        snapshot.claims[0].sequence = u64::MAX - 1;
        let restored = AirdropService::restore(&snapshot, ledger.clone()).unwrap();

        let claimant = addr(2);
        assert_eq!(
            restored.claim(&claimant, &tree.proof_for_address(&claimant).unwrap()),
            Err(AirdropError::ClaimFailed {
                claimant,
                reason: ClaimFailure::SequenceExhausted
            })
        );
        assert!(!restored.is_claimed(&claimant));
        assert_eq!(ledger.balance_of(&claimant), 0);

        snapshot.claims[0].sequence = u64::MAX;
        assert!(matches!(
            AirdropService::restore(&snapshot, ledger),
            Err(AirdropError::InvalidSnapshot(_))
        ));
    }
}
