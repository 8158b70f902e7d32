use airdrop_engine::{AirdropError, ClaimFailure, LedgerError};
use airdrop_testing::{whitelist, BalanceSnapshot, FixtureStage, TestFixture, TEST_AMOUNT_PER_CLAIM};

/// Test that a claim is rolled back when the pool cannot pay
///
/// **Test flow:**
/// 1. Fund the pool for exactly one claim
/// 2. First claim drains the pool
/// 3. Second claim fails with `InsufficientBalance` and leaves no trace
/// 4. Top up the pool and retry the same claim successfully
#[test]
fn test_claim_vault_completely_drained() {
    let mut test = TestFixture::new().with_pool_funds(TEST_AMOUNT_PER_CLAIM);
    test.jump_to(FixtureStage::CampaignInitialized);

    let first = whitelist()[0];
    let second = whitelist()[1];

    // 2. Drain
    test.try_claim(&first).unwrap();
    assert_eq!(test.remaining_allowance(), 0);

    // 3. Fail and roll back
    let before = BalanceSnapshot::capture_with_claimants(&test, &[first, second]);
    let err = test.try_claim(&second).unwrap_err();
    assert_eq!(
        err,
        AirdropError::InsufficientBalance {
            required: TEST_AMOUNT_PER_CLAIM,
            available: 0
        }
    );
    assert!(err.is_retryable());
    assert!(!test.service.is_claimed(&second));
    assert_eq!(
        before,
        BalanceSnapshot::capture_with_claimants(&test, &[first, second])
    );

    // 4. Retry after top-up
    test.top_up_pool(TEST_AMOUNT_PER_CLAIM);
    assert_eq!(test.try_claim(&second), Ok(TEST_AMOUNT_PER_CLAIM));
    assert_eq!(test.balance_of(&second), TEST_AMOUNT_PER_CLAIM);

    // The rolled-back attempt consumed sequence 2
    let record = test.service.claim_record(&second).unwrap();
    assert_eq!(record.sequence, 3);
}

/// Pool balance without an approval for the service cannot be paid out.
#[test]
fn test_claim_without_allowance() {
    let test = TestFixture::initialized();
    test.token_ledger
        .approve(&test.admin, &test.service_address, 0);

    let claimant = whitelist()[4];
    let err = test.try_claim(&claimant).unwrap_err();
    assert!(matches!(err, AirdropError::InsufficientBalance { available: 0, .. }));
    assert!(!test.service.is_claimed(&claimant));
    assert_eq!(test.balance_of(&claimant), 0);
}

/// A ledger timeout surfaces as `ClaimFailed` and the mark is undone.
#[test]
fn test_claim_ledger_timeout() {
    let test = TestFixture::initialized();
    let claimant = whitelist()[3];
    let before = BalanceSnapshot::capture_with_claimants(&test, &[claimant]);

    test.scripted_ledger.fail_next(LedgerError::Timeout);
    assert_eq!(
        test.try_claim(&claimant),
        Err(AirdropError::ClaimFailed {
            claimant,
            reason: ClaimFailure::LedgerTimeout
        })
    );
    assert_eq!(test.scripted_ledger.pending_failures(), 0);
    assert_eq!(before, BalanceSnapshot::capture_with_claimants(&test, &[claimant]));

    // Nothing was retried automatically
    assert_eq!(test.scripted_ledger.transfer_calls(), 1);

    // The caller may retry once the ledger recovers
    assert_eq!(test.try_claim(&claimant), Ok(TEST_AMOUNT_PER_CLAIM));
}

/// Other ledger failures are reported with their cause.
#[test]
fn test_claim_ledger_unavailable() {
    let test = TestFixture::initialized();
    let claimant = whitelist()[6];

    test.scripted_ledger
        .fail_next(LedgerError::Unavailable("connection reset".to_string()));

    match test.try_claim(&claimant) {
        Err(AirdropError::ClaimFailed {
            reason: ClaimFailure::LedgerRejected(cause),
            ..
        }) => assert!(cause.contains("connection reset")),
        other => panic!("Expected ledger rejection, got {other:?}"),
    }
    assert!(!test.service.is_claimed(&claimant));
}

/// A failed claim does not disturb claims that already succeeded.
#[test]
fn test_rollback_leaves_other_claims() {
    let test = TestFixture::initialized();
    let paid = whitelist()[0];
    let failing = whitelist()[1];

    test.try_claim(&paid).unwrap();
    test.scripted_ledger.fail_next(LedgerError::Timeout);
    test.try_claim(&failing).unwrap_err();

    assert!(test.service.is_claimed(&paid));
    assert!(!test.service.is_claimed(&failing));
    assert_eq!(test.service.claimed_addresses(), vec![paid]);
    assert_eq!(test.balance_of(&paid), TEST_AMOUNT_PER_CLAIM);
}
