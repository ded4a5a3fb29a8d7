/// Token catalog: the fixed, ordered set of resources the dashboard queries
///
/// Built once from configuration and never mutated. Cloning a `Catalog` is
/// cheap; the items are shared.
use crate::config::CatalogItemConfig;
use crate::errors::ConfigError;
use crate::utils::parse_address;
use alloy_primitives::Address;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Largest scale whose power of ten fits in a `U256`
pub const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TrackedItem {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub collateral: bool,
}

impl TrackedItem {
    pub fn new(address: Address, symbol: &str, name: &str, decimals: u8, collateral: bool) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            collateral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Arc<[TrackedItem]>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate addresses
    pub fn new(items: Vec<TrackedItem>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.address) {
                return Err(ConfigError::DuplicateCatalogItem {
                    address: item.address.to_string(),
                });
            }
        }

        Ok(Self {
            items: items.into(),
        })
    }

    /// Build from the `[[catalog]]` entries of the config file
    pub fn from_config(entries: &[CatalogItemConfig]) -> Result<Self, ConfigError> {
        let mut items = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let address = parse_address(&format!("catalog[{}].address", index), &entry.address)?;
            let symbol = entry.symbol.trim();
            if symbol.is_empty() {
                return Err(ConfigError::InvalidField {
                    field: format!("catalog[{}].symbol", index),
                    reason: "symbol is required".to_string(),
                });
            }
            if entry.decimals > MAX_DECIMALS {
                return Err(ConfigError::InvalidField {
                    field: format!("catalog[{}].decimals", index),
                    reason: format!("{} exceeds the maximum of {}", entry.decimals, MAX_DECIMALS),
                });
            }
            let name = if entry.name.trim().is_empty() {
                symbol
            } else {
                entry.name.trim()
            };

            items.push(TrackedItem::new(address, symbol, name, entry.decimals, entry.collateral));
        }

        Self::new(items)
    }

    /// Ordered subset of items flagged as collateral
    pub fn collateral(&self) -> Catalog {
        Catalog {
            items: self.items.iter().filter(|item| item.collateral).cloned().collect(),
        }
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive symbol lookup
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&TrackedItem> {
        let wanted = symbol.trim();
        self.items
            .iter()
            .find(|item| item.symbol.eq_ignore_ascii_case(wanted))
    }

    pub fn find_by_address(&self, address: &Address) -> Option<&TrackedItem> {
        self.items.iter().find(|item| &item.address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(address: &str, symbol: &str, collateral: bool) -> CatalogItemConfig {
        CatalogItemConfig {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: String::new(),
            decimals: 18,
            collateral,
        }
    }

    #[test]
    fn test_collateral_subset_keeps_order() {
        let catalog = Catalog::from_config(&[
            entry("0x1111111111111111111111111111111111111111", "WETH", true),
            entry("0x2222222222222222222222222222222222222222", "GOV", false),
            entry("0x3333333333333333333333333333333333333333", "WBTC", true),
        ])
        .unwrap();

        let collateral = catalog.collateral();
        let symbols: Vec<&str> = collateral.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["WETH", "WBTC"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let err = Catalog::from_config(&[
            entry("0x1111111111111111111111111111111111111111", "WETH", true),
            entry("0x1111111111111111111111111111111111111111", "WETH2", true),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCatalogItem { .. }));
    }

    #[test]
    fn test_missing_symbol_rejected() {
        let err = Catalog::from_config(&[entry("0x1111111111111111111111111111111111111111", " ", true)])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "catalog[0].symbol"));
    }

    #[test]
    fn test_decimals_beyond_u256_range_rejected() {
        let mut wide = entry("0x1111111111111111111111111111111111111111", "WIDE", true);
        wide.decimals = 78;
        let err = Catalog::from_config(&[wide.clone()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "catalog[0].decimals"));

        wide.decimals = MAX_DECIMALS;
        assert!(Catalog::from_config(&[wide]).is_ok());
    }

    #[test]
    fn test_name_defaults_to_symbol_and_lookup_ignores_case() {
        let catalog =
            Catalog::from_config(&[entry("0x1111111111111111111111111111111111111111", "WETH", true)]).unwrap();
        let item = catalog.find_by_symbol("weth").unwrap();
        assert_eq!(item.name, "WETH");
        assert!(catalog.find_by_address(&item.address).is_some());
        assert!(catalog.find_by_symbol("DAI").is_none());
    }
}
