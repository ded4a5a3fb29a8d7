//! Time-to-live cache of per-account balance snapshots
//!
//! Each account has its own slot holding the last installed snapshot and, while
//! a fetch is running, the shared future every caller for that account awaits.
//! Fetches run as spawned tasks: they complete even if every caller goes away,
//! and their result is installed only if the slot still points at them.
use super::fetcher::BalanceFetcher;
use super::types::{BalanceEntry, CacheMetrics, CacheSnapshot, CacheState};
use crate::catalog::Catalog;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::errors::{CacheError, ConfigError, TransportError};
use crate::logger::{self, LogTag};
use crate::rpc::ContractReader;
use alloy_primitives::Address;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(10);

pub type SnapshotResult = Result<Arc<CacheSnapshot>, CacheError>;
type SharedFetch = Shared<BoxFuture<'static, SnapshotResult>>;

struct PendingFetch {
    id: u64,
    future: SharedFetch,
}

#[derive(Default)]
struct AccountSlot {
    snapshot: Option<Arc<CacheSnapshot>>,
    /// Set by `invalidate`: fetches with an id below this started before it
    /// and cannot make the slot fresh again.
    invalidated_before: Option<u64>,
    pending: Option<PendingFetch>,
}

impl AccountSlot {
    fn fresh_snapshot(&self, now: Instant, ttl: Duration) -> Option<Arc<CacheSnapshot>> {
        if self.invalidated_before.is_some() {
            return None;
        }
        self.snapshot
            .as_ref()
            .filter(|snapshot| snapshot.is_fresh(now, ttl))
            .cloned()
    }

    fn state(&self, now: Instant, ttl: Duration) -> CacheState {
        match &self.snapshot {
            None => CacheState::Empty,
            Some(_) if self.fresh_snapshot(now, ttl).is_some() => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    fn is_pending(&self, id: u64) -> bool {
        self.pending.as_ref().map(|pending| pending.id) == Some(id)
    }

    /// Nothing cached and nothing in flight
    fn is_vacant(&self) -> bool {
        self.snapshot.is_none() && self.pending.is_none()
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    coalesced: AtomicU64,
    transport_failures: AtomicU64,
    discarded: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct CacheInner {
    reader: Arc<dyn ContractReader>,
    clock: Arc<dyn Clock>,
    fetcher: BalanceFetcher,
    ttl: Duration,
    slots: Mutex<HashMap<Address, AccountSlot>>,
    next_fetch_id: AtomicU64,
    counters: Counters,
}

impl CacheInner {
    async fn run_fetch(&self, account: Address, id: u64) -> SnapshotResult {
        Counters::bump(&self.counters.fetches);
        logger::debug(
            LogTag::Cache,
            &format!(
                "Fetching {} balances for {} (fetch #{})",
                self.fetcher.catalog().len(),
                account,
                id
            ),
        );

        let result = self
            .fetcher
            .fetch_snapshot(self.reader.as_ref(), self.clock.as_ref(), account)
            .await;

        self.complete(account, id, result)
    }

    /// Install a finished fetch if its slot still expects it
    fn complete(
        &self,
        account: Address,
        id: u64,
        result: Result<CacheSnapshot, TransportError>,
    ) -> SnapshotResult {
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(&account).filter(|slot| slot.is_pending(id));

        match (result, slot) {
            (Ok(snapshot), Some(slot)) => {
                let snapshot = Arc::new(snapshot);
                slot.snapshot = Some(Arc::clone(&snapshot));
                slot.invalidated_before = slot.invalidated_before.filter(|mark| id < *mark);
                slot.pending = None;
                Ok(snapshot)
            }
            (Ok(snapshot), None) => {
                Counters::bump(&self.counters.discarded);
                logger::debug(
                    LogTag::Cache,
                    &format!("Discarding balances for {}: account no longer tracked", account),
                );
                Ok(Arc::new(snapshot))
            }
            (Err(error), slot) => {
                if let Some(slot) = slot {
                    slot.pending = None;
                    if slot.is_vacant() {
                        slots.remove(&account);
                    }
                }
                Counters::bump(&self.counters.transport_failures);
                logger::warning(
                    LogTag::Cache,
                    &format!("Balance fetch for {} failed: {}", account, error),
                );
                Err(error.into())
            }
        }
    }

    fn release_pending(&self, account: Address, id: u64) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(&account) {
            if slot.is_pending(id) {
                slot.pending = None;
                if slot.is_vacant() {
                    slots.remove(&account);
                }
            }
        }
    }
}

/// Batched, time-to-live cache of collateral balances keyed by account.
///
/// Cloning is cheap and every clone shares the same state. An account keeps
/// its slot while it has a snapshot or a fetch in flight; `forget` and `clear`
/// release accounts that are no longer shown.
#[derive(Clone)]
pub struct BatchedBalanceCache {
    inner: Arc<CacheInner>,
}

impl BatchedBalanceCache {
    pub fn new(reader: Arc<dyn ContractReader>, fetcher: BalanceFetcher, ttl: Duration) -> Self {
        Self::with_clock(reader, fetcher, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        reader: Arc<dyn ContractReader>,
        fetcher: BalanceFetcher,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                reader,
                clock,
                fetcher,
                ttl,
                slots: Mutex::new(HashMap::new()),
                next_fetch_id: AtomicU64::new(1),
                counters: Counters::default(),
            }),
        }
    }

    /// Cache over the collateral subset of the configured catalog
    pub fn from_config(config: &Config, reader: Arc<dyn ContractReader>) -> Result<Self, ConfigError> {
        let catalog = Catalog::from_config(&config.catalog)?.collateral();
        let fetcher = BalanceFetcher::new(config.pool_address()?, catalog);
        Ok(Self::new(reader, fetcher, config.freshness_window()))
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    pub fn catalog(&self) -> &Catalog {
        self.inner.fetcher.catalog()
    }

    /// Current snapshot for `account`, fetching only when missing or stale
    pub async fn load(&self, account: &str) -> SnapshotResult {
        let account = parse_account(account)?;

        let fetch = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(account).or_default();

            if let Some(snapshot) = slot.fresh_snapshot(self.inner.clock.monotonic(), self.inner.ttl) {
                Counters::bump(&self.inner.counters.hits);
                logger::verbose(LogTag::Cache, &format!("Cache hit for {}", account));
                return Ok(snapshot);
            }

            Counters::bump(&self.inner.counters.misses);
            self.join_or_start(account, slot)
        };

        fetch.await
    }

    /// Fetch regardless of freshness; joins a fetch already in flight
    pub async fn refetch(&self, account: &str) -> SnapshotResult {
        let account = parse_account(account)?;

        let fetch = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(account).or_default();
            self.join_or_start(account, slot)
        };

        fetch.await
    }

    /// Single read of one catalog item, bypassing the snapshot
    pub async fn fetch_item(&self, account: &str, symbol: &str) -> Result<BalanceEntry, CacheError> {
        let account = parse_account(account)?;
        let item = self
            .catalog()
            .find_by_symbol(symbol)
            .cloned()
            .ok_or_else(|| CacheError::UnknownItem(symbol.to_string()))?;

        let entry = self
            .inner
            .fetcher
            .fetch_entry(self.inner.reader.as_ref(), account, &item)
            .await?;
        Ok(entry)
    }

    /// Last installed snapshot, fresh or stale, without any remote call
    pub fn peek(&self, account: &str) -> Option<Arc<CacheSnapshot>> {
        let account = parse_account(account).ok()?;
        self.inner
            .slots
            .lock()
            .get(&account)
            .and_then(|slot| slot.snapshot.clone())
    }

    pub fn state(&self, account: &str) -> CacheState {
        let Ok(account) = parse_account(account) else {
            return CacheState::Empty;
        };
        let now = self.inner.clock.monotonic();
        self.inner
            .slots
            .lock()
            .get(&account)
            .map(|slot| slot.state(now, self.inner.ttl))
            .unwrap_or(CacheState::Empty)
    }

    pub fn is_fetch_pending(&self, account: &str) -> bool {
        let Ok(account) = parse_account(account) else {
            return false;
        };
        self.inner
            .slots
            .lock()
            .get(&account)
            .map(|slot| slot.pending.is_some())
            .unwrap_or(false)
    }

    /// Mark the snapshot stale; it stays readable through `peek`.
    ///
    /// A fetch already in flight still installs its result, but the slot stays
    /// stale until a fetch started after this call completes.
    pub fn invalidate(&self, account: &str) {
        let Ok(account) = parse_account(account) else {
            return;
        };
        let mut slots = self.inner.slots.lock();
        if let Some(slot) = slots.get_mut(&account) {
            slot.invalidated_before = Some(self.inner.next_fetch_id.load(Ordering::Relaxed));
        }
    }

    /// Drop everything held for `account`.
    ///
    /// A fetch still in flight resolves for its callers but is not installed.
    pub fn forget(&self, account: &str) {
        let Ok(account) = parse_account(account) else {
            return;
        };
        if let Some(slot) = self.inner.slots.lock().remove(&account) {
            if slot.pending.is_some() {
                logger::debug(
                    LogTag::Cache,
                    &format!("Forgetting {} with a fetch in flight", account),
                );
            }
        }
    }

    /// Accounts currently holding a snapshot or a fetch in flight
    pub fn tracked_accounts(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Forget every account
    pub fn clear(&self) {
        self.inner.slots.lock().clear();
    }

    pub fn metrics(&self) -> CacheMetrics {
        let counters = &self.inner.counters;
        CacheMetrics {
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            fetches: counters.fetches.load(Ordering::Relaxed),
            coalesced: counters.coalesced.load(Ordering::Relaxed),
            transport_failures: counters.transport_failures.load(Ordering::Relaxed),
            discarded: counters.discarded.load(Ordering::Relaxed),
        }
    }

    fn join_or_start(&self, account: Address, slot: &mut AccountSlot) -> SharedFetch {
        if let Some(pending) = &slot.pending {
            Counters::bump(&self.inner.counters.coalesced);
            logger::verbose(
                LogTag::Cache,
                &format!("Joining fetch #{} for {}", pending.id, account),
            );
            return pending.future.clone();
        }

        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let future = self.spawn_fetch(account, id);
        slot.pending = Some(PendingFetch {
            id,
            future: future.clone(),
        });
        future
    }

    fn spawn_fetch(&self, account: Address, id: u64) -> SharedFetch {
        let task_inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { task_inner.run_fetch(account, id).await });

        let cleanup_inner = Arc::clone(&self.inner);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    cleanup_inner.release_pending(account, id);
                    Err(CacheError::FetchAborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Parse an account identifier; blank input means no account is connected
pub fn parse_account(account: &str) -> Result<Address, CacheError> {
    let trimmed = account.trim();
    if trimmed.is_empty() {
        return Err(CacheError::AccountMissing);
    }

    Address::from_str(trimmed).map_err(|e| CacheError::InvalidAccount {
        account: trimmed.to_string(),
        reason: e.to_string(),
    })
}
