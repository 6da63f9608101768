//! Adversarial ledgers and concurrent claimers.
//!
//! - A ledger that calls back into `claim` during the transfer
//! - Several threads racing on the same index
//! - A ledger that fails, checked for full rollback

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Weak};
use std::thread;

use dropcraft_core::{Address, Amount, Entitlement, Hash, TokenId};
use dropcraft_settlement::{
    Distributor, EventLog, InMemoryLedger, Ownable, SettlementError, TokenLedger, TransferError,
};
use dropcraft_tree::Distribution;
use parking_lot::Mutex;

const OWNER: Address = [0xEE; 20];
const TOKEN: TokenId = [0x7A; 20];

// ============================================================================
// Callback ledger
// ============================================================================

/// Replays the same claim from inside `transfer`, recording what it saw.
struct ReentrantLedger {
    inner: InMemoryLedger,
    distributor: Mutex<Option<Weak<Distributor>>>,
    replay: Mutex<Option<(u64, Address, Amount, Vec<Hash>)>>,
    nested_results: Mutex<Vec<Result<(), SettlementError>>>,
}

impl ReentrantLedger {
    fn new() -> Self {
        Self {
            inner: InMemoryLedger::new(),
            distributor: Mutex::new(None),
            replay: Mutex::new(None),
            nested_results: Mutex::new(Vec::new()),
        }
    }
}

impl TokenLedger for ReentrantLedger {
    fn transfer(&self, token: &TokenId, to: &Address, amount: Amount) -> Result<(), TransferError> {
        // Take the replay so the nested call does not recurse again
        let replay = self.replay.lock().take();
        let distributor = self.distributor.lock().as_ref().and_then(Weak::upgrade);

        if let (Some((index, account, amount, proof)), Some(distributor)) = (replay, distributor) {
            let nested = distributor.claim(token, index, &account, amount, &proof).map(|_| ());
            self.nested_results.lock().push(nested);
        }

        self.inner.transfer(token, to, amount)
    }
}

fn distribution(n: u8) -> Distribution {
    dropcraft_logging::init_test();
    let entries: Vec<_> = (0..n)
        .map(|i| Entitlement::new(i as u64, [0x20 + i; 20], 100u64))
        .collect();
    Distribution::from_entitlements(Some(TOKEN), &entries).unwrap()
}

#[test]
fn test_reentrant_claim_sees_index_claimed() {
    let dist = distribution(4);
    let ledger = Arc::new(ReentrantLedger::new());
    ledger.inner.set_balance(TOKEN, dist.total_amount);
    let events = Arc::new(EventLog::new());

    let distributor = Arc::new(Distributor::new(
        Arc::new(Ownable::new(OWNER)),
        ledger.clone(),
        events.clone(),
    ));
    *ledger.distributor.lock() = Some(Arc::downgrade(&distributor));
    distributor.set_root(&OWNER, TOKEN, dist.merkle_root).unwrap();

    let claim = &dist.claims[2];
    *ledger.replay.lock() = Some((claim.index, claim.account, claim.amount, claim.proof.clone()));

    distributor
        .claim(&TOKEN, claim.index, &claim.account, claim.amount, &claim.proof)
        .unwrap();

    assert_eq!(
        *ledger.nested_results.lock(),
        vec![Err(SettlementError::AlreadyClaimed { index: claim.index })]
    );
    assert_eq!(ledger.inner.balance_of(&TOKEN, &claim.account), claim.amount);
    assert_eq!(events.len(), 1);
}

#[test]
fn test_reentrant_claim_of_other_index_succeeds() {
    let dist = distribution(4);
    let ledger = Arc::new(ReentrantLedger::new());
    ledger.inner.set_balance(TOKEN, dist.total_amount);
    let events = Arc::new(EventLog::new());

    let distributor = Arc::new(Distributor::new(
        Arc::new(Ownable::new(OWNER)),
        ledger.clone(),
        events.clone(),
    ));
    *ledger.distributor.lock() = Some(Arc::downgrade(&distributor));
    distributor.set_root(&OWNER, TOKEN, dist.merkle_root).unwrap();

    let (outer, inner) = (&dist.claims[0], &dist.claims[3]);
    *ledger.replay.lock() = Some((inner.index, inner.account, inner.amount, inner.proof.clone()));

    distributor
        .claim(&TOKEN, outer.index, &outer.account, outer.amount, &outer.proof)
        .unwrap();

    assert_eq!(*ledger.nested_results.lock(), vec![Ok(())]);
    assert!(distributor.is_claimed(&TOKEN, outer.index));
    assert!(distributor.is_claimed(&TOKEN, inner.index));
    // Nested claim completes first, so its event is emitted first
    let indices: Vec<u64> = events.claimed_events().iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![inner.index, outer.index]);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_claims_single_winner() {
    const THREADS: usize = 8;

    let dist = Arc::new(distribution(3));
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.set_balance(TOKEN, dist.total_amount);
    let events = Arc::new(EventLog::new());
    let distributor = Arc::new(Distributor::new(
        Arc::new(Ownable::new(OWNER)),
        ledger.clone(),
        events.clone(),
    ));
    distributor.set_root(&OWNER, TOKEN, dist.merkle_root).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let wins = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let (dist, distributor, barrier, wins) =
                (dist.clone(), distributor.clone(), barrier.clone(), wins.clone());
            thread::spawn(move || {
                let claim = &dist.claims[1];
                barrier.wait();
                match distributor.claim(&TOKEN, claim.index, &claim.account, claim.amount, &claim.proof) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => assert_eq!(e, SettlementError::AlreadyClaimed { index: claim.index }),
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let claim = &dist.claims[1];
    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_eq!(events.len(), 1);
    assert_eq!(ledger.balance_of(&TOKEN, &claim.account), claim.amount);
}

#[test]
fn test_concurrent_claims_distinct_indices() {
    let dist = Arc::new(distribution(16));
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.set_balance(TOKEN, dist.total_amount);
    let distributor = Arc::new(Distributor::new(
        Arc::new(Ownable::new(OWNER)),
        ledger.clone(),
        Arc::new(EventLog::new()),
    ));
    distributor.set_root(&OWNER, TOKEN, dist.merkle_root).unwrap();

    let handles: Vec<_> = (0..dist.claims.len())
        .map(|i| {
            let (dist, distributor) = (dist.clone(), distributor.clone());
            thread::spawn(move || {
                let claim = &dist.claims[i];
                distributor
                    .claim(&TOKEN, claim.index, &claim.account, claim.amount, &claim.proof)
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(distributor.store().claimed_count(&TOKEN), 16);
    assert_eq!(ledger.reserve_of(&TOKEN), Amount::zero());
}

// ============================================================================
// Rollback
// ============================================================================

/// Fails the first `failures` transfers, then delegates.
struct FlakyLedger {
    inner: InMemoryLedger,
    failures: AtomicUsize,
}

impl TokenLedger for FlakyLedger {
    fn transfer(&self, token: &TokenId, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(TransferError::Rejected("ledger unavailable".to_string()));
        }
        self.inner.transfer(token, to, amount)
    }
}

#[test]
fn test_failed_transfer_leaves_no_trace() {
    let dist = distribution(2);
    let ledger = Arc::new(FlakyLedger {
        inner: InMemoryLedger::new(),
        failures: AtomicUsize::new(2),
    });
    ledger.inner.set_balance(TOKEN, dist.total_amount);
    let events = Arc::new(EventLog::new());
    let distributor = Distributor::new(Arc::new(Ownable::new(OWNER)), ledger.clone(), events.clone());
    distributor.set_root(&OWNER, TOKEN, dist.merkle_root).unwrap();

    let claim = &dist.claims[0];
    for _ in 0..2 {
        let result = distributor.claim(&TOKEN, claim.index, &claim.account, claim.amount, &claim.proof);
        assert!(matches!(result, Err(SettlementError::TransferFailed(_))));
        assert!(!distributor.is_claimed(&TOKEN, claim.index));
        assert_eq!(distributor.store().claimed_count(&TOKEN), 0);
        assert!(events.is_empty());
        assert_eq!(ledger.inner.reserve_of(&TOKEN), dist.total_amount);
    }

    distributor
        .claim(&TOKEN, claim.index, &claim.account, claim.amount, &claim.proof)
        .unwrap();
    assert!(distributor.is_claimed(&TOKEN, claim.index));
    assert_eq!(events.len(), 1);
}
