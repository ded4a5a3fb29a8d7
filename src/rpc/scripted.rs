//! Scripted `ContractReader` for unit tests
use super::types::{CallOutcome, ReadCall};
use super::ContractReader;
use crate::errors::TransportError;
use alloy_primitives::{Bytes, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

type Responder = Box<dyn Fn(&[ReadCall]) -> Result<Vec<CallOutcome>, TransportError> + Send + Sync>;

/// ABI encoding of a single `uint256` return value
pub(crate) fn encode_amount(value: u64) -> Bytes {
    Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec())
}

pub(crate) fn transport_down() -> TransportError {
    TransportError::Request {
        endpoint: "http://node".to_string(),
        message: "connection refused".to_string(),
    }
}

pub(crate) struct ScriptedReader {
    responder: Mutex<Responder>,
    gate: Option<Arc<Notify>>,
    batch_calls: AtomicUsize,
    single_calls: AtomicUsize,
    last_batch: Mutex<Vec<ReadCall>>,
}

impl ScriptedReader {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&[ReadCall]) -> Result<Vec<CallOutcome>, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Mutex::new(Box::new(responder)),
            gate: None,
            batch_calls: AtomicUsize::new(0),
            single_calls: AtomicUsize::new(0),
            last_batch: Mutex::new(Vec::new()),
        }
    }

    /// Answer call `i` with `amounts[i]`: `Some` succeeds, `None` reverts
    pub(crate) fn with_amounts(amounts: Vec<Option<u64>>) -> Self {
        Self::new(move |calls| {
            Ok(calls
                .iter()
                .enumerate()
                .map(|(i, _)| match amounts.get(i).copied().flatten() {
                    Some(value) => CallOutcome::Success(encode_amount(value)),
                    None => CallOutcome::Failure("execution reverted".to_string()),
                })
                .collect())
        })
    }

    /// Every batch waits for one `notify_one` on the returned handle
    pub(crate) fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub(crate) fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&[ReadCall]) -> Result<Vec<CallOutcome>, TransportError> + Send + Sync + 'static,
    {
        *self.responder.lock() = Box::new(responder);
    }

    pub(crate) fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_batch(&self) -> Vec<ReadCall> {
        self.last_batch.lock().clone()
    }

    fn respond(&self, calls: &[ReadCall]) -> Result<Vec<CallOutcome>, TransportError> {
        let responder = self.responder.lock();
        (*responder)(calls)
    }
}

#[async_trait]
impl ContractReader for ScriptedReader {
    async fn read(&self, call: &ReadCall) -> Result<CallOutcome, TransportError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        let mut outcomes = self.respond(std::slice::from_ref(call))?;
        if outcomes.is_empty() {
            return Err(TransportError::MalformedResponse("no outcome".to_string()));
        }
        Ok(outcomes.remove(0))
    }

    async fn read_batch(
        &self,
        calls: &[ReadCall],
        _allow_partial_failure: bool,
    ) -> Result<Vec<CallOutcome>, TransportError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_batch.lock() = calls.to_vec();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.respond(calls)
    }
}
