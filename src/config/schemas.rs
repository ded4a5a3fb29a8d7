/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides
/// embedded defaults and serde support.
use crate::config_struct;
use crate::errors::ConfigError;
use crate::utils::parse_address;
use alloy_primitives::Address;
use std::time::Duration;

/// Canonical Multicall3 deployment (same address on most EVM chains)
pub const MULTICALL3_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

// ============================================================================
// RPC CONFIGURATION
// ============================================================================

config_struct! {
    /// JSON-RPC endpoint configuration
    pub struct RpcConfig {
        /// Node URL used for eth_call
        url: String = "http://127.0.0.1:8545".to_string(),
        /// Multicall3 contract used for batched reads
        multicall_address: String = MULTICALL3_ADDRESS.to_string(),
        /// Per-request timeout (seconds)
        timeout_secs: u64 = 10,
    }
}

// ============================================================================
// PROTOCOL CONFIGURATION
// ============================================================================

config_struct! {
    /// Deployed lending protocol contracts
    pub struct ProtocolConfig {
        /// Lending pool queried for collateral balances
        pool_address: String = String::new(),
    }
}

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

config_struct! {
    /// Balance cache configuration
    pub struct CacheSettings {
        /// Age after which a snapshot is refetched (seconds)
        freshness_window_secs: u64 = 10,
    }
}

// ============================================================================
// CATALOG
// ============================================================================

config_struct! {
    /// One `[[catalog]]` entry
    pub struct CatalogItemConfig {
        address: String = String::new(),
        symbol: String = String::new(),
        name: String = String::new(),
        decimals: u8 = 18,
        /// Whether the token is part of the queried collateral set
        collateral: bool = true,
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    /// Root configuration
    pub struct Config {
        rpc: RpcConfig = RpcConfig::default(),
        protocol: ProtocolConfig = ProtocolConfig::default(),
        cache: CacheSettings = CacheSettings::default(),
        catalog: Vec<CatalogItemConfig> = Vec::new(),
    }
}

impl Config {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.cache.freshness_window_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.timeout_secs)
    }

    pub fn pool_address(&self) -> Result<Address, ConfigError> {
        parse_address("protocol.pool_address", &self.protocol.pool_address)
    }

    pub fn multicall_address(&self) -> Result<Address, ConfigError> {
        parse_address("rpc.multicall_address", &self.rpc.multicall_address)
    }

    /// Check fields that have no meaningful default
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.url.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "rpc.url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.rpc.timeout_secs == 0 {
            return Err(ConfigError::InvalidField {
                field: "rpc.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.cache.freshness_window_secs == 0 {
            return Err(ConfigError::InvalidField {
                field: "cache.freshness_window_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        self.multicall_address()?;
        self.pool_address()?;
        Ok(())
    }
}
