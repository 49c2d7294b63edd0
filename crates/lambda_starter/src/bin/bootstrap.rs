use lambda_runtime::{service_fn, Error, LambdaEvent};
use lambda_starter::adapters::lambda_context::execution_context_from_lambda;
use lambda_starter::handlers::event::EventHandler;
use lambda_starter::logging::{init_tracing, LogFormat};
use lambda_starter_core::contract::{CanonicalEvent, ResponseEnvelope};
use serde_json::Value;

async fn handle_request(
    handler: &EventHandler,
    event: LambdaEvent<Value>,
) -> Result<ResponseEnvelope, Error> {
    let (payload, context) = event.into_parts();
    let context = execution_context_from_lambda(&context);
    Ok(handler.handle(&CanonicalEvent::new(payload), &context))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing(LogFormat::Json);

    let handler = EventHandler::default();
    let handler = &handler;
    lambda_runtime::run(service_fn(move |event| handle_request(handler, event))).await
}
