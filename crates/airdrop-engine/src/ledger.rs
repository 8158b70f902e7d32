use airdrop_merkle::Address;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors a token ledger can report back to the claim engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("Insufficient allowance: need {required}, have {available}")]
    InsufficientAllowance { required: u128, available: u128 },

    #[error("Balance overflow crediting {0}")]
    Overflow(Address),

    #[error("Ledger call timed out")]
    Timeout,

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// The token ledger the claim engine pays out from.
///
/// `transfer` is synchronous and must either move the full amount or change
/// nothing. Implementations own their timeout policy and report it as
/// [`LedgerError::Timeout`].
pub trait TokenLedger: Send + Sync {
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()>;

    fn balance_of(&self, owner: &Address) -> u128;
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
}

impl LedgerState {
    fn balance(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        let available = self.balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

/// Balance/allowance ledger held in memory.
///
/// `transfer` moves balance directly. The `approve`/`transfer_from` pair gives
/// the pre-authorization flow where an admin approves a spender once and the
/// spender then pays out of the admin's balance.
#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new tokens for `to`
    pub fn mint(&self, to: &Address, amount: u128) -> LedgerResult<()> {
        let mut state = self.state.lock();
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;
        let balance = state
            .balance(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;

        state.total_supply = supply;
        state.balances.insert(*to, balance);
        debug!("Minted {} to {}", amount, to);
        Ok(())
    }

    /// Allow `spender` to move up to `amount` of `owner`'s tokens. Replaces any
    /// previous allowance.
    pub fn approve(&self, owner: &Address, spender: &Address, amount: u128) {
        self.state
            .lock()
            .allowances
            .insert((*owner, *spender), amount);
        debug!("{} approved {} to spend {}", owner, spender, amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.state.lock().allowance(owner, spender)
    }

    pub fn total_supply(&self) -> u128 {
        self.state.lock().total_supply
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    pub fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> LedgerResult<()> {
        let mut state = self.state.lock();

        let allowance = state.allowance(from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                required: amount,
                available: allowance,
            });
        }

        state.move_balance(from, to, amount)?;
        state
            .allowances
            .insert((*from, *spender), allowance - amount);
        Ok(())
    }

    /// A view of this ledger whose `transfer` acts as `spender` via `transfer_from`.
    pub fn spender(self: &Arc<Self>, spender: Address) -> SpenderLedger {
        SpenderLedger {
            ledger: Arc::clone(self),
            spender,
        }
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        self.state.lock().move_balance(from, to, amount)
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.state.lock().balance(owner)
    }
}

/// [`InMemoryTokenLedger`] seen through an approved spender identity
#[derive(Debug, Clone)]
pub struct SpenderLedger {
    ledger: Arc<InMemoryTokenLedger>,
    spender: Address,
}

impl SpenderLedger {
    pub fn spender_address(&self) -> Address {
        self.spender
    }

    pub fn ledger(&self) -> &Arc<InMemoryTokenLedger> {
        &self.ledger
    }
}

impl TokenLedger for SpenderLedger {
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> LedgerResult<()> {
        self.ledger.transfer_from(&self.spender, from, to, amount)
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.ledger.balance_of(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    #[test]
    fn test_mint_and_transfer() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(&addr(1), 100).unwrap();

        ledger.transfer(&addr(1), &addr(2), 40).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), 60);
        assert_eq!(ledger.balance_of(&addr(2)), 40);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn test_transfer_insufficient_balance_changes_nothing() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(&addr(1), 10).unwrap();

        let result = ledger.transfer(&addr(1), &addr(2), 11);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance {
                required: 11,
                available: 10
            })
        );
        assert_eq!(ledger.balance_of(&addr(1)), 10);
        assert_eq!(ledger.balance_of(&addr(2)), 0);
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(&addr(1), 10).unwrap();
        ledger.transfer(&addr(1), &addr(1), 10).unwrap();
        assert_eq!(ledger.balance_of(&addr(1)), 10);
    }

    #[test]
    fn test_mint_overflow() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(&addr(1), u128::MAX).unwrap();
        assert_eq!(ledger.mint(&addr(2), 1), Err(LedgerError::Overflow(addr(2))));
        assert_eq!(ledger.balance_of(&addr(2)), 0);
    }

    #[test]
    fn test_spender_consumes_allowance() {
        let ledger = Arc::new(InMemoryTokenLedger::new());
        let owner = addr(1);
        let service = addr(9);
        ledger.mint(&owner, 1_000).unwrap();
        ledger.approve(&owner, &service, 300);

        let spender = ledger.spender(service);
        spender.transfer(&owner, &addr(2), 200).unwrap();

        assert_eq!(ledger.allowance(&owner, &service), 100);
        assert_eq!(spender.balance_of(&addr(2)), 200);
        assert_eq!(
            spender.transfer(&owner, &addr(3), 101),
            Err(LedgerError::InsufficientAllowance {
                required: 101,
                available: 100
            })
        );
        assert_eq!(ledger.balance_of(&owner), 800);
    }

    #[test]
    fn test_spender_insufficient_balance_keeps_allowance() {
        let ledger = Arc::new(InMemoryTokenLedger::new());
        let owner = addr(1);
        let service = addr(9);
        ledger.mint(&owner, 5).unwrap();
        ledger.approve(&owner, &service, 1_000);

        let result = ledger.spender(service).transfer(&owner, &addr(2), 6);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(ledger.allowance(&owner, &service), 1_000);
    }
}
