use alloy_primitives::{Address, Bytes};
use serde::Serialize;

/// One read against a contract: target plus ABI-encoded call data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    pub target: Address,
    /// Function signature, kept for logging
    pub function: &'static str,
    pub call_data: Bytes,
}

impl ReadCall {
    pub fn new(target: Address, function: &'static str, call_data: impl Into<Bytes>) -> Self {
        Self {
            target,
            function,
            call_data: call_data.into(),
        }
    }
}

/// Per-call outcome of a read, in the same position as its request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success(Bytes),
    Failure(String),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }
}

/// Request counters for a transport
#[derive(Debug, Clone, Default, Serialize)]
pub struct RpcStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub batched_calls: u64,
    pub average_response_time_ms: u64,
}

impl RpcStats {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            (self.successful_requests as f64) / (self.total_requests as f64)
        }
    }

    pub fn record_success(&mut self, response_time_ms: u64) {
        self.total_requests += 1;
        self.successful_requests += 1;
        // Running mean over successful requests
        let n = self.successful_requests;
        self.average_response_time_ms =
            (self.average_response_time_ms * (n - 1) + response_time_ms) / n;
    }

    pub fn record_failure(&mut self) {
        self.total_requests += 1;
        self.failed_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_success_rate_and_average() {
        let mut stats = RpcStats::default();
        assert_eq!(stats.success_rate(), 1.0);

        stats.record_success(100);
        stats.record_success(300);
        stats.record_failure();

        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.average_response_time_ms, 200);
        assert!((stats.success_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
    }
}
