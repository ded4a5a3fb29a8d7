//! Collateral balances: batched fetch plus per-account freshness cache
pub mod cache;
pub mod fetcher;
pub mod types;


pub use cache::{parse_account, BatchedBalanceCache, SnapshotResult, DEFAULT_FRESHNESS_WINDOW};
pub use fetcher::{decode_amount, BalanceFetcher, COLLATERAL_BALANCE_FN};
pub use types::{BalanceEntry, CacheMetrics, CacheSnapshot, CacheState};
