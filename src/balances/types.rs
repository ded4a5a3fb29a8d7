use crate::catalog::TrackedItem;
use crate::errors::ItemFetchError;
use crate::utils::format_token_amount;
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// One catalog item joined with its fetched amount, or the reason it is absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceEntry {
    pub item: TrackedItem,
    pub amount: Option<U256>,
    #[serde(skip)]
    pub error: Option<ItemFetchError>,
}

impl BalanceEntry {
    pub fn present(item: TrackedItem, amount: U256) -> Self {
        Self {
            item,
            amount: Some(amount),
            error: None,
        }
    }

    pub fn absent(item: TrackedItem, error: ItemFetchError) -> Self {
        Self {
            item,
            amount: None,
            error: Some(error),
        }
    }

    pub fn is_present(&self) -> bool {
        self.amount.is_some()
    }

    pub fn is_absent(&self) -> bool {
        self.amount.is_none()
    }

    /// Amount scaled by the item's decimals
    pub fn display_amount(&self) -> Option<String> {
        self.amount
            .map(|amount| format_token_amount(amount, self.item.decimals))
    }
}

/// Immutable, ordered balances of one account at one point in time.
///
/// `entries[i]` always belongs to `catalog[i]` of the catalog it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub account: Address,
    pub entries: Vec<BalanceEntry>,
    pub captured_at: DateTime<Utc>,
    #[serde(skip)]
    captured_instant: Instant,
}

impl CacheSnapshot {
    pub fn new(
        account: Address,
        entries: Vec<BalanceEntry>,
        captured_at: DateTime<Utc>,
        captured_instant: Instant,
    ) -> Self {
        Self {
            account,
            entries,
            captured_at,
            captured_instant,
        }
    }

    pub fn captured_instant(&self) -> Instant {
        self.captured_instant
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.captured_instant)
    }

    /// Fresh while younger than `ttl`; an age equal to `ttl` is already stale
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&BalanceEntry> {
        self.entries
            .iter()
            .find(|entry| entry.item.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_present()).count()
    }

    pub fn absent_count(&self) -> usize {
        self.entries.len() - self.present_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No snapshot yet
    Empty,
    Fresh,
    /// Snapshot older than the freshness window, or invalidated
    Stale,
}

/// Counters for monitoring the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    /// Batch fetches started
    pub fetches: u64,
    /// Callers that joined a fetch already in flight
    pub coalesced: u64,
    pub transport_failures: u64,
    /// Completed fetches whose account had been forgotten meanwhile
    pub discarded: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
