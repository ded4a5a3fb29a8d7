/// Log tags identify the subsystem a message comes from.
///
/// Each tag has a debug key used by `--debug <key>` to enable its debug output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Cache,
    Rpc,
    Wallet,
    Dashboard,
}

impl LogTag {
    /// Key matched against `--debug <key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Cache => "cache".to_string(),
            LogTag::Rpc => "rpc".to_string(),
            LogTag::Wallet => "wallet".to_string(),
            LogTag::Dashboard => "dashboard".to_string(),
        }
    }

    /// Uncolored label used in the log prefix
    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
