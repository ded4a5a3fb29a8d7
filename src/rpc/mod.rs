//! Remote contract read layer
//!
//! `ContractReader` is the seam between the balance cache and the chain. The
//! production implementation is `RpcClient` (JSON-RPC `eth_call` with
//! Multicall3 batching); tests drive the cache with a scripted reader.
pub mod abi;
pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod scripted;

use crate::errors::TransportError;
use async_trait::async_trait;

pub use client::RpcClient;
pub use types::{CallOutcome, ReadCall, RpcStats};

#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Execute a single read.
    ///
    /// A revert is reported as `CallOutcome::Failure`; only transport-level
    /// problems are errors.
    async fn read(&self, call: &ReadCall) -> Result<CallOutcome, TransportError>;

    /// Execute many reads in one round trip.
    ///
    /// The result has one outcome per call, in input order. With
    /// `allow_partial_failure` a failing call does not abort the others.
    async fn read_batch(
        &self,
        calls: &[ReadCall],
        allow_partial_failure: bool,
    ) -> Result<Vec<CallOutcome>, TransportError>;
}
