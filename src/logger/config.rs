/// Logger configuration: minimum level and per-tag debug switches
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Most detailed level that may be printed
    pub min_level: LogLevel,
    /// Tags whose debug output is enabled (`--debug <key>`)
    pub debug_tags: HashSet<String>,
    /// Restrict output to these tags (empty = all)
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

impl LoggerConfig {
    /// Build a configuration from command-line style switches.
    ///
    /// `--verbose` lifts the threshold to Verbose and enables debug for every tag,
    /// `--quiet` drops it to Warning. Debug modules are matched case-insensitively.
    pub fn from_flags(verbose: bool, quiet: bool, debug_modules: &[String]) -> Self {
        let mut config = Self::default();

        if quiet {
            config.min_level = LogLevel::Warning;
        }
        if !debug_modules.is_empty() {
            config.min_level = LogLevel::Debug;
        }
        if verbose {
            config.min_level = LogLevel::Verbose;
        }

        config.debug_tags = debug_modules
            .iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();

        config
    }

    pub fn is_debug_enabled_for(&self, tag: &LogTag) -> bool {
        self.min_level == LogLevel::Verbose || self.debug_tags.contains(&tag.to_debug_key())
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Get a copy of the active logger configuration
pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the active logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    match LOGGER_CONFIG.write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags_debug_modules() {
        let config = LoggerConfig::from_flags(false, false, &["Cache".to_string()]);
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.is_debug_enabled_for(&LogTag::Cache));
        assert!(!config.is_debug_enabled_for(&LogTag::Rpc));
    }

    #[test]
    fn test_verbose_enables_every_tag() {
        let config = LoggerConfig::from_flags(true, true, &[]);
        assert_eq!(config.min_level, LogLevel::Verbose);
        assert!(config.is_debug_enabled_for(&LogTag::Wallet));
    }

    #[test]
    fn test_quiet_threshold() {
        let config = LoggerConfig::from_flags(false, true, &[]);
        assert_eq!(config.min_level, LogLevel::Warning);
    }
}
