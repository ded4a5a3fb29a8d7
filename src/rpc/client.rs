//! JSON-RPC transport over `eth_call`, batching through Multicall3
use super::abi::IMulticall3;
use super::types::{CallOutcome, ReadCall, RpcStats};
use super::ContractReader;
use crate::config::Config;
use crate::errors::{ConfigError, TransportError};
use crate::logger::{self, LogTag};
use alloy_primitives::{hex, Address, Bytes};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Geth-style "execution reverted" error code
const EXECUTION_REVERTED_CODE: i64 = 3;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    multicall: Address,
    next_id: AtomicU64,
    stats: Mutex<RpcStats>,
}

impl RpcClient {
    pub fn new(url: &str, multicall: Address, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                endpoint: url.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            url: url.to_string(),
            multicall,
            next_id: AtomicU64::new(1),
            stats: Mutex::new(RpcStats::default()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let multicall = config.multicall_address()?;
        Self::new(&config.rpc.url, multicall, config.request_timeout()).map_err(|e| {
            ConfigError::InvalidField {
                field: "rpc.url".to_string(),
                reason: e.to_string(),
            }
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn stats(&self) -> RpcStats {
        self.stats.lock().clone()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let start = Instant::now();
        let result = self.send(method, params).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => self.stats.lock().record_success(elapsed_ms),
            Err(e) => {
                self.stats.lock().record_failure();
                logger::debug(
                    LogTag::Rpc,
                    &format!("{} failed after {}ms: {}", method, elapsed_ms, e),
                );
            }
        }

        result
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let payload = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                endpoint: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                endpoint: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse(format!("{}: {}", method, e)))?;

        parse_response(method, body)
    }

    async fn eth_call(&self, to: Address, data: &Bytes) -> Result<Bytes, TransportError> {
        logger::verbose(
            LogTag::Rpc,
            &format!("eth_call to {} ({} bytes)", to, data.len()),
        );

        let params = json!([{ "to": to, "data": hex::encode_prefixed(data) }, "latest"]);
        let result = self.request("eth_call", params).await?;

        let encoded = result.as_str().ok_or_else(|| {
            TransportError::MalformedResponse(format!("eth_call result is not a string: {}", result))
        })?;

        hex::decode(encoded)
            .map(Bytes::from)
            .map_err(|e| TransportError::MalformedResponse(format!("eth_call result is not hex: {}", e)))
    }
}

fn parse_response(method: &str, body: JsonRpcResponse) -> Result<Value, TransportError> {
    if let Some(error) = body.error {
        return Err(TransportError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    body.result
        .ok_or_else(|| TransportError::MalformedResponse(format!("{} returned neither result nor error", method)))
}

fn is_revert(code: i64, message: &str) -> bool {
    code == EXECUTION_REVERTED_CODE || message.to_lowercase().contains("revert")
}

/// Human-readable reason for a failed Multicall3 sub-call
fn describe_revert(return_data: &[u8]) -> String {
    if return_data.is_empty() {
        return "reverted without reason".to_string();
    }

    alloy_sol_types::decode_revert_reason(return_data)
        .unwrap_or_else(|| format!("reverted with data {}", hex::encode_prefixed(return_data)))
}

#[async_trait]
impl ContractReader for RpcClient {
    async fn read(&self, call: &ReadCall) -> Result<CallOutcome, TransportError> {
        match self.eth_call(call.target, &call.call_data).await {
            Ok(data) => Ok(CallOutcome::Success(data)),
            Err(TransportError::Rpc { code, message }) if is_revert(code, &message) => {
                logger::debug(
                    LogTag::Rpc,
                    &format!("{} on {} reverted: {}", call.function, call.target, message),
                );
                Ok(CallOutcome::Failure(message))
            }
            Err(e) => Err(e),
        }
    }

    async fn read_batch(
        &self,
        calls: &[ReadCall],
        allow_partial_failure: bool,
    ) -> Result<Vec<CallOutcome>, TransportError> {
        let batch = IMulticall3::aggregate3Call {
            calls: calls
                .iter()
                .map(|call| IMulticall3::Call3 {
                    target: call.target,
                    allowFailure: allow_partial_failure,
                    callData: call.call_data.clone(),
                })
                .collect(),
        };

        let raw = self.eth_call(self.multicall, &Bytes::from(batch.abi_encode())).await?;
        self.stats.lock().batched_calls += calls.len() as u64;

        let decoded = IMulticall3::aggregate3Call::abi_decode_returns(&raw, true)
            .map_err(|e| TransportError::MalformedResponse(format!("aggregate3 return data: {}", e)))?;

        Ok(decoded
            .returnData
            .into_iter()
            .map(|result| {
                if result.success {
                    CallOutcome::Success(result.returnData)
                } else {
                    CallOutcome::Failure(describe_revert(&result.returnData))
                }
            })
            .collect())
    }
}
