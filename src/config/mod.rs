/// Configuration system
///
/// - `config_struct!` declares structures with embedded defaults
/// - `schemas` holds every section of `config.toml`
/// - `utils` loads and exposes the global configuration
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{CacheSettings, CatalogItemConfig, Config, ProtocolConfig, RpcConfig, MULTICALL3_ADDRESS};
pub use utils::{
    get_config_clone, load_config_from_path, parse_config, read_config_file, with_config,
    CONFIG_FILE_PATH,
};
