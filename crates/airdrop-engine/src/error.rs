use airdrop_merkle::Address;
use std::fmt;
use thiserror::Error;

use crate::ledger::LedgerError;

pub type AirdropResult<T> = Result<T, AirdropError>;

/// Why a claim was rejected as `ClaimFailed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimFailure {
    /// Address not in the allow-list, or the proof is malformed
    InvalidProof,
    /// The ledger's own timeout expired; the transfer outcome was rolled back locally
    LedgerTimeout,
    /// The ledger refused the transfer for a reason other than funds
    LedgerRejected(String),
    /// The registry has no sequence numbers left to assign
    SequenceExhausted,
}

impl fmt::Display for ClaimFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimFailure::InvalidProof => f.write_str("not in allow-list or malformed proof"),
            ClaimFailure::LedgerTimeout => f.write_str("token ledger timed out"),
            ClaimFailure::LedgerRejected(reason) => write!(f, "token ledger rejected transfer: {reason}"),
            ClaimFailure::SequenceExhausted => f.write_str("claim sequence exhausted"),
        }
    }
}

/// Every way a campaign call can fail. Callers match on variants; the
/// messages are for people.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AirdropError {
    #[error("Campaign has already been initialized")]
    AlreadyInitialized,

    #[error("Campaign has not been initialized")]
    NotInitialized,

    #[error("claim fail for {claimant}: {reason}")]
    ClaimFailed {
        claimant: Address,
        reason: ClaimFailure,
    },

    #[error("address has already claimed: {claimant}")]
    AlreadyClaimed { claimant: Address },

    #[error("Insufficient pool balance: need {required}, have {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("Invalid campaign snapshot: {0}")]
    InvalidSnapshot(String),
}

impl AirdropError {
    /// Map a ledger failure during a claim onto the claim error taxonomy.
    pub(crate) fn from_ledger(claimant: Address, err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                required,
                available,
            }
            | LedgerError::InsufficientAllowance {
                required,
                available,
            } => AirdropError::InsufficientBalance {
                required,
                available,
            },
            LedgerError::Timeout => AirdropError::ClaimFailed {
                claimant,
                reason: ClaimFailure::LedgerTimeout,
            },
            other => AirdropError::ClaimFailed {
                claimant,
                reason: ClaimFailure::LedgerRejected(other.to_string()),
            },
        }
    }

    /// Whether the same call could succeed later without changing its inputs.
    ///
    /// Only pool funding problems qualify: once the pool is topped up the
    /// rolled-back claim can be replayed. Proof failures need a corrected proof,
    /// a double claim never succeeds, and ledger timeouts are left to the caller
    /// to reconcile before any retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AirdropError::InsufficientBalance { .. })
    }
}
