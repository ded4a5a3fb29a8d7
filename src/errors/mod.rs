/// Error taxonomy for lendscope
///
/// - `TransportError`: the remote call itself failed, surfaced to callers
/// - `ItemFetchError`: one catalog item failed, stored in its balance entry
/// - `CacheError`: what cache and dashboard operations return
/// - `ConfigError`: loading and validating configuration
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Batch returned {actual} results for {expected} calls")]
    OutcomeCountMismatch { expected: usize, actual: usize },
}

impl TransportError {
    /// Errors worth retrying on the next refresh tick
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransportError::Request { .. } => true,
            TransportError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            TransportError::Rpc { .. } => true,
            TransportError::MalformedResponse(_) => false,
            TransportError::OutcomeCountMismatch { .. } => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemFetchError {
    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("could not decode return data: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("No account connected")]
    AccountMissing,

    #[error("Invalid account '{account}': {reason}")]
    InvalidAccount { account: String, reason: String },

    #[error("Unknown catalog item: {0}")]
    UnknownItem(String),

    #[error("Balance fetch did not complete: {0}")]
    FetchAborted(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CacheError {
    pub fn is_transport(&self) -> bool {
        matches!(self, CacheError::Transport(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config file '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid config field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Catalog lists {address} more than once")]
    DuplicateCatalogItem { address: String },

    #[error("Config already initialized")]
    AlreadyInitialized,

    #[error("Config not initialized. Call load_config_from_path() first.")]
    NotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_converts_into_cache_error() {
        let err: CacheError = TransportError::MalformedResponse("empty".to_string()).into();
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Malformed response: empty");
    }

    #[test]
    fn test_recoverable_classification() {
        let busy = TransportError::HttpStatus {
            endpoint: "http://node".to_string(),
            status: 503,
        };
        let denied = TransportError::HttpStatus {
            endpoint: "http://node".to_string(),
            status: 401,
        };
        assert!(busy.is_recoverable());
        assert!(!denied.is_recoverable());
        assert!(!TransportError::OutcomeCountMismatch { expected: 2, actual: 1 }.is_recoverable());
    }
}
