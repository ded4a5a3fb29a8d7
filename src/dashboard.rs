//! Collateral dashboard: follows the connected account and shows its balances
//!
//! The dashboard owns which account is being tracked. Switching or
//! disconnecting the wallet forgets the previous account in the cache, so a
//! fetch still running for it can never overwrite what is on screen.
use crate::balances::{parse_account, BatchedBalanceCache, CacheSnapshot, CacheState, SnapshotResult};
use crate::errors::CacheError;
use crate::logger::{self, LogTag};
use crate::wallet::WalletProvider;
use alloy_primitives::Address;
use parking_lot::Mutex;
use std::sync::Arc;

/// What to render: a snapshot, plus a warning when it could not be refreshed
#[derive(Debug, Clone)]
pub struct BalanceView {
    pub snapshot: Option<Arc<CacheSnapshot>>,
    pub state: CacheState,
    pub warning: Option<CacheError>,
}

impl BalanceView {
    /// Showing last known values (or nothing) because a refresh failed
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

pub struct CollateralDashboard<W: WalletProvider> {
    cache: BatchedBalanceCache,
    wallet: W,
    tracked: Mutex<Option<Address>>,
}

impl<W: WalletProvider> CollateralDashboard<W> {
    pub fn new(cache: BatchedBalanceCache, wallet: W) -> Self {
        Self {
            cache,
            wallet,
            tracked: Mutex::new(None),
        }
    }

    pub fn cache(&self) -> &BatchedBalanceCache {
        &self.cache
    }

    pub fn tracked_account(&self) -> Option<Address> {
        *self.tracked.lock()
    }

    /// Balances of the connected account, from cache when fresh
    pub async fn current(&self) -> SnapshotResult {
        let account = self.sync_account()?;
        self.cache.load(&account).await
    }

    /// User-triggered refresh
    pub async fn refresh(&self) -> SnapshotResult {
        let account = self.sync_account()?;
        self.cache.refetch(&account).await
    }

    /// Like `current`, but a transport failure degrades to the last known values
    pub async fn view(&self) -> Result<BalanceView, CacheError> {
        let account = self.sync_account()?;
        let result = self.cache.load(&account).await;
        Ok(self.to_view(&account, result))
    }

    /// Like `refresh`, but a transport failure degrades to the last known values
    pub async fn refresh_view(&self) -> Result<BalanceView, CacheError> {
        let account = self.sync_account()?;
        let result = self.cache.refetch(&account).await;
        Ok(self.to_view(&account, result))
    }

    /// Stop tracking; nothing fetched afterwards for the old account is kept
    pub fn teardown(&self) {
        if let Some(previous) = self.tracked.lock().take() {
            self.cache.forget(&previous.to_string());
        }
    }

    fn to_view(&self, account: &str, result: SnapshotResult) -> BalanceView {
        match result {
            Ok(snapshot) => BalanceView {
                snapshot: Some(snapshot),
                state: self.cache.state(account),
                warning: None,
            },
            Err(error) => {
                logger::warning(
                    LogTag::Dashboard,
                    &format!("Couldn't refresh balances, showing last known values: {}", error),
                );
                BalanceView {
                    snapshot: self.cache.peek(account),
                    state: self.cache.state(account),
                    warning: Some(error),
                }
            }
        }
    }

    /// Resolve the connected account and retire the previous one if it changed
    fn sync_account(&self) -> Result<String, CacheError> {
        let connected = match self.wallet.connected_account() {
            Some(account) => Some(parse_account(&account)?),
            None => None,
        };

        let mut tracked = self.tracked.lock();
        if *tracked != connected {
            if let Some(previous) = tracked.take() {
                self.cache.forget(&previous.to_string());
                logger::info(LogTag::Dashboard, &format!("Stopped tracking {}", previous));
            }
            if let Some(account) = connected {
                logger::info(LogTag::Dashboard, &format!("Tracking {}", account));
            }
            *tracked = connected;
        }

        connected
            .map(|account| account.to_string())
            .ok_or(CacheError::AccountMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balances::BalanceFetcher;
    use crate::catalog::{Catalog, TrackedItem};
    use crate::clock::ManualClock;
    use crate::rpc::scripted::{transport_down, ScriptedReader};
    use crate::wallet::SessionWallet;
    use alloy_primitives::U256;
    use std::time::Duration;

    const ALICE: &str = "0x000000000000000000000000000000000000a11c";
    const BOB: &str = "0x0000000000000000000000000000000000000b0b";

    fn dashboard(
        reader: ScriptedReader,
    ) -> (CollateralDashboard<Arc<SessionWallet>>, Arc<ScriptedReader>, Arc<SessionWallet>) {
        let reader = Arc::new(reader);
        let catalog = Catalog::new(vec![TrackedItem::new(
            Address::repeat_byte(0x10),
            "WETH",
            "Wrapped Ether",
            18,
            true,
        )])
        .unwrap();
        let cache = BatchedBalanceCache::with_clock(
            reader.clone(),
            BalanceFetcher::new(Address::repeat_byte(0x99), catalog),
            Duration::from_secs(10),
            Arc::new(ManualClock::new()),
        );
        let wallet = Arc::new(SessionWallet::new());
        (CollateralDashboard::new(cache, wallet.clone()), reader, wallet)
    }

    #[tokio::test]
    async fn test_disconnected_wallet_fails_fast() {
        let (dashboard, reader, _wallet) = dashboard(ScriptedReader::with_amounts(vec![Some(1)]));

        assert_eq!(dashboard.current().await.unwrap_err(), CacheError::AccountMissing);
        assert!(matches!(dashboard.view().await, Err(CacheError::AccountMissing)));
        assert_eq!(reader.batch_calls(), 0);
    }

    #[tokio::test]
    async fn test_account_switch_forgets_previous_account() {
        let (dashboard, reader, wallet) = dashboard(ScriptedReader::with_amounts(vec![Some(1)]));

        wallet.connect(ALICE);
        dashboard.current().await.unwrap();
        assert_eq!(dashboard.cache().state(ALICE), CacheState::Fresh);

        wallet.connect(BOB);
        let snapshot = dashboard.current().await.unwrap();

        assert_eq!(snapshot.account, parse_account(BOB).unwrap());
        assert_eq!(dashboard.tracked_account(), Some(parse_account(BOB).unwrap()));
        assert_eq!(dashboard.cache().state(ALICE), CacheState::Empty);
        assert_eq!(reader.batch_calls(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_forgets_tracked_account() {
        let (dashboard, _reader, wallet) = dashboard(ScriptedReader::with_amounts(vec![Some(1)]));

        wallet.connect(ALICE);
        dashboard.current().await.unwrap();
        wallet.disconnect();

        assert_eq!(dashboard.current().await.unwrap_err(), CacheError::AccountMissing);
        assert_eq!(dashboard.tracked_account(), None);
        assert_eq!(dashboard.cache().state(ALICE), CacheState::Empty);
    }

    #[tokio::test]
    async fn test_view_falls_back_to_last_known_values() {
        let (dashboard, reader, wallet) = dashboard(ScriptedReader::with_amounts(vec![Some(42)]));

        wallet.connect(ALICE);
        let fresh = dashboard.view().await.unwrap();
        assert!(!fresh.is_degraded());

        reader.set_responder(|_| Err(transport_down()));
        let degraded = dashboard.refresh_view().await.unwrap();

        assert!(degraded.is_degraded());
        assert!(matches!(degraded.warning, Some(CacheError::Transport(_))));
        let snapshot = degraded.snapshot.unwrap();
        assert_eq!(snapshot.entries[0].amount, Some(U256::from(42u64)));
    }

    #[tokio::test]
    async fn test_view_without_history_is_empty_on_failure() {
        let (dashboard, _reader, wallet) = dashboard(ScriptedReader::new(|_| Err(transport_down())));

        wallet.connect(ALICE);
        let view = dashboard.view().await.unwrap();

        assert!(view.snapshot.is_none());
        assert_eq!(view.state, CacheState::Empty);
        assert!(view.is_degraded());
    }

    #[tokio::test]
    async fn test_refresh_and_teardown() {
        let (dashboard, reader, wallet) = dashboard(ScriptedReader::with_amounts(vec![Some(1)]));

        wallet.connect(ALICE);
        dashboard.current().await.unwrap();
        dashboard.refresh().await.unwrap();
        assert_eq!(reader.batch_calls(), 2);

        dashboard.teardown();
        assert_eq!(dashboard.tracked_account(), None);
        assert_eq!(dashboard.cache().state(ALICE), CacheState::Empty);
    }

    #[tokio::test]
    async fn test_invalid_connected_account() {
        let (dashboard, reader, wallet) = dashboard(ScriptedReader::with_amounts(vec![Some(1)]));

        wallet.connect("not-an-address");
        assert!(matches!(
            dashboard.current().await.unwrap_err(),
            CacheError::InvalidAccount { .. }
        ));
        assert_eq!(reader.batch_calls(), 0);
    }
}
