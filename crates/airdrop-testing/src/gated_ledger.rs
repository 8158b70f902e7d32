use airdrop_engine::{LedgerError, LedgerResult, TokenLedger};
use airdrop_merkle::Address;
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

/// How long a test waits on the other side of the gate before giving up
const GATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ledger wrapper that parks every `transfer` until the test lets it finish.
///
/// Lets a test hold a claim between "marked claimed" and "paid" and observe
/// the engine from another thread. Transfers are released one at a time.
pub struct GatedLedger {
    inner: Arc<dyn TokenLedger>,
    entered: Mutex<Sender<Address>>,
    outcomes: Mutex<Receiver<Option<LedgerError>>>,
}

/// The test's side of a [`GatedLedger`]
pub struct LedgerGate {
    entered: Receiver<Address>,
    outcomes: Sender<Option<LedgerError>>,
}

impl GatedLedger {
    pub fn new(inner: Arc<dyn TokenLedger>) -> (Arc<Self>, LedgerGate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        let ledger = Arc::new(Self {
            inner,
            entered: Mutex::new(entered_tx),
            outcomes: Mutex::new(outcome_rx),
        });
        let gate = LedgerGate {
            entered: entered_rx,
            outcomes: outcome_tx,
        };
        (ledger, gate)
    }
}

impl TokenLedger for GatedLedger {
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        let outcomes = self.outcomes.lock();
        // A dropped gate just lets transfers through
        let _ = self.entered.lock().send(*to);

        match outcomes.recv_timeout(GATE_TIMEOUT) {
            Ok(Some(error)) => Err(error),
            Ok(None) | Err(_) => self.inner.transfer(from, to, amount),
        }
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.inner.balance_of(owner)
    }
}

impl LedgerGate {
    /// Block until a transfer reaches the ledger, returning its recipient.
    pub fn wait_for_transfer(&self) -> Address {
        self.entered
            .recv_timeout(GATE_TIMEOUT)
            .unwrap_or_else(|e| panic!("No transfer reached the ledger: {e}"))
    }

    /// Let the parked transfer go through to the inner ledger.
    pub fn release(&self) {
        self.outcomes
            .send(None)
            .unwrap_or_else(|e| panic!("Ledger is gone: {e}"));
    }

    /// Fail the parked transfer with `error` without touching the inner ledger.
    pub fn fail(&self, error: LedgerError) {
        self.outcomes
            .send(Some(error))
            .unwrap_or_else(|e| panic!("Ledger is gone: {e}"));
    }
}
