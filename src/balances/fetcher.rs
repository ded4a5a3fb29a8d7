//! Batch fetch of every catalog item for one account
use super::types::{BalanceEntry, CacheSnapshot};
use crate::catalog::{Catalog, TrackedItem};
use crate::clock::Clock;
use crate::errors::{ItemFetchError, TransportError};
use crate::logger::{self, LogTag};
use crate::rpc::abi::ILendingPool;
use crate::rpc::{CallOutcome, ContractReader, ReadCall};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

pub const COLLATERAL_BALANCE_FN: &str = "getCollateralBalance(address,address)";

#[derive(Debug, Clone)]
pub struct BalanceFetcher {
    pool: Address,
    catalog: Catalog,
}

impl BalanceFetcher {
    pub fn new(pool: Address, catalog: Catalog) -> Self {
        Self { pool, catalog }
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn build_call(&self, account: Address, item: &TrackedItem) -> ReadCall {
        let call = ILendingPool::getCollateralBalanceCall {
            account,
            token: item.address,
        };
        ReadCall::new(self.pool, COLLATERAL_BALANCE_FN, call.abi_encode())
    }

    /// One call per catalog item, in catalog order
    pub fn build_calls(&self, account: Address) -> Vec<ReadCall> {
        self.catalog
            .iter()
            .map(|item| self.build_call(account, item))
            .collect()
    }

    /// Fetch every item in one batched round trip.
    ///
    /// Item failures become absent entries; only a failure of the batch itself
    /// (or a batch answering with the wrong number of outcomes) is an error.
    pub async fn fetch_snapshot(
        &self,
        reader: &dyn ContractReader,
        clock: &dyn Clock,
        account: Address,
    ) -> Result<CacheSnapshot, TransportError> {
        let calls = self.build_calls(account);
        let outcomes = reader.read_batch(&calls, true).await?;

        if outcomes.len() != calls.len() {
            return Err(TransportError::OutcomeCountMismatch {
                expected: calls.len(),
                actual: outcomes.len(),
            });
        }

        let entries: Vec<BalanceEntry> = self
            .catalog
            .iter()
            .zip(outcomes)
            .map(|(item, outcome)| entry_from_outcome(item, outcome))
            .collect();

        let absent = entries.iter().filter(|entry| entry.is_absent()).count();
        if absent > 0 {
            logger::debug(
                LogTag::Cache,
                &format!("{} of {} balances unavailable for {}", absent, entries.len(), account),
            );
        }

        Ok(CacheSnapshot::new(account, entries, clock.wall(), clock.monotonic()))
    }

    /// Single read of one item, outside any batch
    pub async fn fetch_entry(
        &self,
        reader: &dyn ContractReader,
        account: Address,
        item: &TrackedItem,
    ) -> Result<BalanceEntry, TransportError> {
        let outcome = reader.read(&self.build_call(account, item)).await?;
        Ok(entry_from_outcome(item, outcome))
    }
}

fn entry_from_outcome(item: &TrackedItem, outcome: CallOutcome) -> BalanceEntry {
    match decode_amount(outcome) {
        Ok(amount) => BalanceEntry::present(item.clone(), amount),
        Err(error) => {
            logger::verbose(LogTag::Cache, &format!("{}: {}", item.symbol, error));
            BalanceEntry::absent(item.clone(), error)
        }
    }
}

pub fn decode_amount(outcome: CallOutcome) -> Result<U256, ItemFetchError> {
    match outcome {
        CallOutcome::Success(data) => ILendingPool::getCollateralBalanceCall::abi_decode_returns(&data, true)
            .map(|ret| ret.balance)
            .map_err(|e| ItemFetchError::Decode(e.to_string())),
        CallOutcome::Failure(reason) => Err(ItemFetchError::Reverted(reason)),
    }
}
