pub mod balances;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod errors;
pub mod logger;
pub mod rpc;
pub mod utils;
pub mod wallet;
