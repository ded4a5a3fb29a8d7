use super::schemas::Config;
/// Configuration utilities - loading and access helpers
use crate::errors::ConfigError;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::RwLock;

/// Global configuration instance
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Parse configuration text; `path` is only used in error messages
pub fn parse_config(contents: &str, path: &str) -> Result<Config, ConfigError> {
    let config = toml::from_str::<Config>(contents).map_err(|e| ConfigError::Parse {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Read configuration from disk, falling back to defaults when the file is missing
pub fn read_config_file(path: &str) -> Result<Config, ConfigError> {
    if !Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    parse_config(&contents, path)
}

/// Load configuration from a specific file path and initialize the global CONFIG
pub fn load_config_from_path(path: &str) -> Result<(), ConfigError> {
    let config = read_config_file(path)?;

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| ConfigError::AlreadyInitialized)?;

    logger::debug(LogTag::Config, &format!("Configuration loaded from '{}'", path));
    Ok(())
}

/// Run a closure against the active configuration
pub fn with_config<F, R>(f: F) -> Result<R, ConfigError>
where
    F: FnOnce(&Config) -> R,
{
    let lock = CONFIG.get().ok_or(ConfigError::NotInitialized)?;
    let result = match lock.read() {
        Ok(config) => f(&config),
        Err(poisoned) => f(&poisoned.into_inner()),
    };
    Ok(result)
}

/// Clone of the active configuration
pub fn get_config_clone() -> Result<Config, ConfigError> {
    with_config(|config| config.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[rpc]
url = "https://rpc.example.org"

[protocol]
pool_address = "0x1111111111111111111111111111111111111111"

[cache]
freshness_window_secs = 30

[[catalog]]
address = "0x2222222222222222222222222222222222222222"
symbol = "WETH"
name = "Wrapped Ether"
decimals = 18

[[catalog]]
address = "0x3333333333333333333333333333333333333333"
symbol = "USDC"
name = "USD Coin"
decimals = 6
collateral = false
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = parse_config(SAMPLE, "sample.toml").unwrap();
        assert_eq!(config.rpc.url, "https://rpc.example.org");
        assert_eq!(config.rpc.timeout_secs, 10);
        assert_eq!(config.freshness_window().as_secs(), 30);
        assert_eq!(config.catalog.len(), 2);
        assert!(config.catalog[0].collateral);
        assert!(!config.catalog[1].collateral);
        assert_eq!(config.catalog[1].decimals, 6);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse_config(
            "[protocol]\npool_address = \"0x1111111111111111111111111111111111111111\"\n",
            "minimal.toml",
        )
        .unwrap();
        assert_eq!(config.cache.freshness_window_secs, 10);
        assert_eq!(config.rpc.multicall_address, super::super::schemas::MULTICALL3_ADDRESS);
        assert!(config.catalog.is_empty());
    }

    #[test]
    fn test_missing_pool_address_rejected() {
        let err = parse_config("", "empty.toml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "protocol.pool_address"));
    }

    #[test]
    fn test_zero_freshness_window_rejected() {
        let err = parse_config(
            "[protocol]\npool_address = \"0x1111111111111111111111111111111111111111\"\n\n[cache]\nfreshness_window_secs = 0\n",
            "zero.toml",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidField { ref field, .. } if field == "cache.freshness_window_secs"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = read_config_file("does/not/exist.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_toml_reports_path() {
        let err = parse_config("[rpc\nurl = 1", "broken.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "broken.toml"));
    }
}
