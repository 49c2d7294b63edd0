use lambda_runtime::Context;
use lambda_starter_core::context::{ExecutionContext, FunctionIdentity};
use serde::Serialize;
use serde_json::Value;

/// Converts the runtime's invocation context into an [`ExecutionContext`].
pub fn execution_context_from_lambda(context: &Context) -> ExecutionContext {
    let config = &context.env_config;
    let function = FunctionIdentity {
        function_name: config.function_name.clone(),
        function_version: config.version.clone(),
        invoked_function_arn: context.invoked_function_arn.clone(),
        memory_limit_mb: u32::try_from(config.memory).unwrap_or(0),
        log_group_name: config.log_group.clone(),
        log_stream_name: config.log_stream.clone(),
    };

    let mut execution =
        ExecutionContext::deployed(context.request_id.clone(), function, context.deadline);
    execution.identity = context.identity.as_ref().and_then(to_json);
    execution.client_context = context.client_context.as_ref().and_then(to_json);
    execution
}

fn to_json(value: &impl Serialize) -> Option<Value> {
    serde_json::to_value(value).ok()
}
