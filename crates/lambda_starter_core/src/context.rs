use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::clock::epoch_millis;

pub const LOCAL_FUNCTION_NAME: &str = "local-lambda-function";
pub const LOCAL_FUNCTION_VERSION: &str = "local";
pub const LOCAL_FUNCTION_ARN: &str = "arn:aws:lambda:local:mock:function:local-lambda-function";
pub const LOCAL_MEMORY_LIMIT_MB: u32 = 128;
pub const LOCAL_TIME_BUDGET_MS: u64 = 30_000;

const REQUEST_ID_ENTROPY_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionIdentity {
    pub function_name: String,
    pub function_version: String,
    pub invoked_function_arn: String,
    pub memory_limit_mb: u32,
    pub log_group_name: String,
    pub log_stream_name: String,
}

impl FunctionIdentity {
    fn local(now_ms: u64) -> Self {
        Self {
            function_name: LOCAL_FUNCTION_NAME.to_string(),
            function_version: LOCAL_FUNCTION_VERSION.to_string(),
            invoked_function_arn: LOCAL_FUNCTION_ARN.to_string(),
            memory_limit_mb: LOCAL_MEMORY_LIMIT_MB,
            log_group_name: format!("/aws/lambda/{LOCAL_FUNCTION_NAME}"),
            log_stream_name: format!("local/{now_ms}"),
        }
    }
}

/// How `remaining_time_ms` is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeBudget {
    /// Counts down to the context's `deadline_ms`.
    Deadline,
    /// Always reports the same number of milliseconds.
    Fixed(u64),
}

/// Per-invocation execution context, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionContext {
    pub request_id: String,
    pub function: FunctionIdentity,
    /// Absolute deadline in epoch milliseconds.
    pub deadline_ms: u64,
    pub time_budget: TimeBudget,
    pub identity: Option<Value>,
    pub client_context: Option<Value>,
}

impl ExecutionContext {
    /// Context for an invocation delivered by the platform.
    pub fn deployed(
        request_id: impl Into<String>,
        function: FunctionIdentity,
        deadline_ms: u64,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            function,
            deadline_ms,
            time_budget: TimeBudget::Deadline,
            identity: None,
            client_context: None,
        }
    }

    /// Synthesized context for local emulation. Every call gets a fresh
    /// request id and a fixed 30s budget.
    pub fn local() -> Self {
        let now_ms = epoch_millis();
        Self {
            request_id: format!("mock-{now_ms}-{}", random_token(REQUEST_ID_ENTROPY_LEN)),
            function: FunctionIdentity::local(now_ms),
            deadline_ms: now_ms + LOCAL_TIME_BUDGET_MS,
            time_budget: TimeBudget::Fixed(LOCAL_TIME_BUDGET_MS),
            identity: None,
            client_context: None,
        }
    }

    pub fn remaining_time_ms(&self) -> u64 {
        match self.time_budget {
            TimeBudget::Fixed(budget_ms) => budget_ms,
            TimeBudget::Deadline => self.deadline_ms.saturating_sub(epoch_millis()),
        }
    }
}

/// Lowercase alphanumeric token used as request-id entropy.
pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn local_contexts_get_distinct_request_ids() {
        let ids: HashSet<String> = (0..64)
            .map(|_| ExecutionContext::local().request_id)
            .collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn local_request_id_has_mock_prefix_and_entropy() {
        let context = ExecutionContext::local();
        let parts: Vec<&str> = context.request_id.splitn(3, '-').collect();

        assert_eq!(parts[0], "mock");
        assert!(parts[1].parse::<u64>().is_ok());
        assert_eq!(parts[2].len(), REQUEST_ID_ENTROPY_LEN);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn local_context_reports_fixed_budget_and_deadline() {
        let context = ExecutionContext::local();

        assert_eq!(context.remaining_time_ms(), LOCAL_TIME_BUDGET_MS);
        assert_eq!(context.remaining_time_ms(), LOCAL_TIME_BUDGET_MS);
        let created_ms: u64 = context.request_id.split('-').nth(1).unwrap().parse().unwrap();
        assert_eq!(context.deadline_ms, created_ms + LOCAL_TIME_BUDGET_MS);
        assert_eq!(context.function.function_name, LOCAL_FUNCTION_NAME);
        assert_eq!(context.function.invoked_function_arn, LOCAL_FUNCTION_ARN);
        assert!(context.identity.is_none());
        assert!(context.client_context.is_none());
    }

    #[test]
    fn deployed_context_counts_down_to_deadline() {
        let function = FunctionIdentity::local(0);
        let future = ExecutionContext::deployed("req-1", function.clone(), epoch_millis() + 5_000);
        let expired = ExecutionContext::deployed("req-2", function, 1);

        let remaining = future.remaining_time_ms();
        assert!(remaining <= 5_000 && remaining > 0);
        assert!(future.remaining_time_ms() <= remaining);
        assert_eq!(expired.remaining_time_ms(), 0);
    }
}
