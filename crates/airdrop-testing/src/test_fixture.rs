use airdrop_engine::{AirdropResult, AirdropService, InMemoryTokenLedger, ServiceConfig, TokenLedger};
use airdrop_merkle::{Address, AllowListTree, Hash, Keccak256Hasher};
use std::sync::Arc;

use crate::{
    deterministic_address, whitelist, FixtureStage, ScriptedLedger, TEST_AMOUNT_PER_CLAIM,
    TEST_POOL_FUNDS,
};

/// A campaign wired end to end: allow-list tree, ledger, and service.
///
/// The admin's own balance is the pool. Funding mints to the admin and
/// approves the service's spender identity, so every claim goes through the
/// allowance path. The service talks to the ledger through a
/// [`ScriptedLedger`] so tests can inject transfer failures.
pub struct TestFixture {
    pub stage: FixtureStage,
    pub admin: Address,
    pub service_address: Address,
    pub allow_list: Vec<Address>,
    pub tree: AllowListTree<Keccak256Hasher>,
    pub token_ledger: Arc<InMemoryTokenLedger>,
    pub scripted_ledger: Arc<ScriptedLedger>,
    pub service: Arc<AirdropService>,

    pool_funds: u128,
}

impl TestFixture {
    /// Fixture over [`whitelist`]
    pub fn new() -> Self {
        Self::with_allow_list(whitelist())
    }

    pub fn with_allow_list(allow_list: Vec<Address>) -> Self {
        let admin = deterministic_address("admin");
        let service_address = deterministic_address("airdrop_service");

        let tree = AllowListTree::<Keccak256Hasher>::from_addresses(&allow_list);
        let token_ledger = Arc::new(InMemoryTokenLedger::new());
        let scripted_ledger = Arc::new(ScriptedLedger::new(Arc::new(
            token_ledger.spender(service_address),
        )));

        let config = ServiceConfig::new(admin).with_amount_per_claim(TEST_AMOUNT_PER_CLAIM);

        Self {
            stage: FixtureStage::TreeBuilt,
            admin,
            service_address,
            allow_list,
            tree,
            token_ledger,
            scripted_ledger,
            service: Arc::new(AirdropService::new(config)),
            pool_funds: TEST_POOL_FUNDS,
        }
    }

    /// Amount minted and approved at [`FixtureStage::PoolFunded`]. Only
    /// meaningful before that stage is reached.
    pub fn with_pool_funds(mut self, pool_funds: u128) -> Self {
        self.pool_funds = pool_funds;
        self
    }

    /// Fixture already at [`FixtureStage::CampaignInitialized`]
    pub fn initialized() -> Self {
        let mut test = Self::new();
        test.jump_to(FixtureStage::CampaignInitialized);
        test
    }

    pub fn jump_to(&mut self, target_stage: FixtureStage) {
        let stages_to_step = FixtureStage::all()
            .iter()
            .copied()
            .filter(|s| *s > self.stage && *s <= target_stage)
            .collect::<Vec<_>>();

        for stage in stages_to_step {
            self.step_to(stage);
        }
    }

    pub fn step_to(&mut self, stage: FixtureStage) {
        match stage {
            FixtureStage::TreeBuilt => {}
            FixtureStage::PoolFunded => self.fund_pool(),
            FixtureStage::CampaignInitialized => self.initialize_campaign(),
        }
        self.stage = stage;
    }

    fn fund_pool(&mut self) {
        self.token_ledger
            .mint(&self.admin, self.pool_funds)
            .unwrap_or_else(|e| panic!("Failed to mint {} to {}: {e}", self.pool_funds, self.admin));
        self.token_ledger
            .approve(&self.admin, &self.service_address, self.pool_funds);
    }

    fn initialize_campaign(&mut self) {
        let ledger: Arc<dyn TokenLedger> = self.scripted_ledger.clone();
        self.service
            .initialize(self.admin, ledger, self.tree.root())
            .unwrap_or_else(|e| panic!("Failed to initialize campaign: {e}"));
    }

    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    /// Proof for the first occurrence of `address` in the allow-list
    pub fn proof_for(&self, address: &Address) -> Vec<Hash> {
        self.tree
            .proof_for_address(address)
            .unwrap_or_else(|e| panic!("No proof for {address}: {e}"))
    }

    /// Claim for `claimant` with its own allow-list proof
    pub fn try_claim(&self, claimant: &Address) -> AirdropResult<u128> {
        let proof = self.proof_for(claimant);
        self.service.claim(claimant, &proof)
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.token_ledger.balance_of(address)
    }

    /// Tokens the service may still pay out
    pub fn remaining_allowance(&self) -> u128 {
        self.token_ledger
            .allowance(&self.admin, &self.service_address)
    }

    /// Mint to the admin and raise the service's allowance by `amount`
    pub fn top_up_pool(&self, amount: u128) {
        self.token_ledger
            .mint(&self.admin, amount)
            .unwrap_or_else(|e| panic!("Failed to top up pool: {e}"));
        let allowance = self.remaining_allowance();
        self.token_ledger
            .approve(&self.admin, &self.service_address, allowance + amount);
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
