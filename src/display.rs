/// Table rendering for the CLI
use crate::balances::{BalanceEntry, CacheMetrics, CacheSnapshot};
use crate::catalog::Catalog;
use crate::dashboard::BalanceView;
use crate::utils::short_address;
use tabled::settings::object::Rows;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
pub struct BalanceRow {
    #[tabled(rename = "Token")]
    pub symbol: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Balance")]
    pub balance: String,
}

impl From<&BalanceEntry> for BalanceRow {
    fn from(entry: &BalanceEntry) -> Self {
        let balance = match (&entry.display_amount(), &entry.error) {
            (Some(amount), _) => amount.clone(),
            (None, Some(error)) => format!("unavailable ({})", error),
            (None, None) => "unavailable".to_string(),
        };

        Self {
            symbol: entry.item.symbol.clone(),
            name: entry.item.name.clone(),
            address: short_address(&entry.item.address),
            balance,
        }
    }
}

#[derive(Tabled)]
pub struct CatalogRow {
    #[tabled(rename = "Token")]
    pub symbol: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Decimals")]
    pub decimals: u8,
    #[tabled(rename = "Collateral")]
    pub collateral: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows)
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

pub fn balances_table(snapshot: &CacheSnapshot) -> String {
    render(snapshot.entries.iter().map(BalanceRow::from).collect())
}

pub fn catalog_table(catalog: &Catalog) -> String {
    render(
        catalog
            .iter()
            .map(|item| CatalogRow {
                symbol: item.symbol.clone(),
                name: item.name.clone(),
                address: item.address.to_string(),
                decimals: item.decimals,
                collateral: if item.collateral { "yes" } else { "no" }.to_string(),
            })
            .collect(),
    )
}

/// Header line, table and an optional warning for one dashboard view
pub fn render_view(view: &BalanceView) -> String {
    let mut out = String::new();

    match &view.snapshot {
        Some(snapshot) => {
            out.push_str(&format!(
                "Account {} at {} ({} of {} available)\n",
                snapshot.account,
                snapshot.captured_at.format("%Y-%m-%d %H:%M:%S UTC"),
                snapshot.present_count(),
                snapshot.len()
            ));
            out.push_str(&balances_table(snapshot));
            out.push('\n');
        }
        None => out.push_str("No balances loaded yet\n"),
    }

    if let Some(warning) = &view.warning {
        out.push_str(&format!("Warning: showing last known values: {}\n", warning));
    }
    out
}

pub fn metrics_line(metrics: &CacheMetrics) -> String {
    format!(
        "cache: {} hits, {} misses ({:.0}% hit rate), {} fetches, {} coalesced, {} transport failures",
        metrics.hits,
        metrics.misses,
        metrics.hit_rate() * 100.0,
        metrics.fetches,
        metrics.coalesced,
        metrics.transport_failures
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balances::CacheState;
    use crate::catalog::TrackedItem;
    use crate::errors::{CacheError, ItemFetchError, TransportError};
    use alloy_primitives::{Address, U256};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Instant;

    fn snapshot() -> CacheSnapshot {
        let weth = TrackedItem::new(Address::repeat_byte(1), "WETH", "Wrapped Ether", 18, true);
        let usdc = TrackedItem::new(Address::repeat_byte(2), "USDC", "USD Coin", 6, true);
        CacheSnapshot::new(
            Address::repeat_byte(0xaa),
            vec![
                BalanceEntry::present(usdc, U256::from(2_500_000u64)),
                BalanceEntry::absent(weth, ItemFetchError::Reverted("paused".to_string())),
            ],
            Utc::now(),
            Instant::now(),
        )
    }

    #[test]
    fn test_balances_table_shows_absent_entries() {
        let table = balances_table(&snapshot());
        assert!(table.contains("2.5"));
        assert!(table.contains("unavailable (call reverted: paused)"));
        assert!(table.find("USDC").unwrap() < table.find("WETH").unwrap());
    }

    #[test]
    fn test_degraded_view_renders_warning() {
        let view = BalanceView {
            snapshot: Some(Arc::new(snapshot())),
            state: CacheState::Stale,
            warning: Some(CacheError::Transport(TransportError::MalformedResponse(
                "empty".to_string(),
            ))),
        };
        let out = render_view(&view);
        assert!(out.contains("1 of 2 available"));
        assert!(out.contains("Warning: showing last known values: Malformed response: empty"));
    }
}
