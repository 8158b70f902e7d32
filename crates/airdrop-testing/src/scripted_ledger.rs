use airdrop_engine::{LedgerError, LedgerResult, TokenLedger};
use airdrop_merkle::Address;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ledger wrapper that fails scripted transfers before delegating the rest.
///
/// Queued failures are consumed one per `transfer` call, in order. A consumed
/// failure never reaches the inner ledger, so no balance moves.
pub struct ScriptedLedger {
    inner: Arc<dyn TokenLedger>,
    failures: Mutex<VecDeque<LedgerError>>,
    transfer_calls: AtomicUsize,
}

impl ScriptedLedger {
    pub fn new(inner: Arc<dyn TokenLedger>) -> Self {
        Self {
            inner,
            failures: Mutex::new(VecDeque::new()),
            transfer_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, error: LedgerError) {
        self.failures.lock().push_back(error);
    }

    pub fn pending_failures(&self) -> usize {
        self.failures.lock().len()
    }

    /// Transfers attempted so far, failed ones included
    pub fn transfer_calls(&self) -> usize {
        self.transfer_calls.load(Ordering::SeqCst)
    }
}

impl TokenLedger for ScriptedLedger {
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        self.inner.transfer(from, to, amount)
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.inner.balance_of(owner)
    }
}
