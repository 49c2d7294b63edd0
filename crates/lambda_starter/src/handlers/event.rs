use lambda_starter_core::context::ExecutionContext;
use lambda_starter_core::contract::{CanonicalEvent, ResponseEnvelope};
use lambda_starter_core::dispatch::{classify_event, RoutineRegistry, KIND_EXAMPLE, KIND_UNKNOWN};
use lambda_starter_core::error::HandlerError;
use serde_json::json;

use crate::logging::{log_error, log_info};
use crate::responses::json_response;
use crate::services::example::handle_example_event;

pub const ERROR_RESPONSE_MESSAGE: &str = "Error processing the request";

const COMPONENT: &str = "event_handler";

/// Registry with every routine this function ships with.
pub fn default_registry() -> RoutineRegistry {
    RoutineRegistry::new().register(KIND_EXAMPLE, handle_example_event)
}

/// Single entry point shared by the Lambda runtime and the local server.
#[derive(Debug)]
pub struct EventHandler {
    registry: RoutineRegistry,
}

impl EventHandler {
    pub fn new(registry: RoutineRegistry) -> Self {
        Self { registry }
    }

    /// Dispatches `event` and wraps the outcome in a response envelope.
    ///
    /// Never fails: routine errors are logged and answered with a generic 500
    /// whose body only carries the request id for correlation.
    pub fn handle(&self, event: &CanonicalEvent, context: &ExecutionContext) -> ResponseEnvelope {
        log_info(
            COMPONENT,
            "event_received",
            json!({
                "request_id": context.request_id.clone(),
                "event_type": event.event_type().unwrap_or(KIND_UNKNOWN),
                "kind": classify_event(event),
            }),
        );

        match self.process(event, context) {
            Ok(body) => ResponseEnvelope::new(200, body),
            Err(error) => {
                log_error(
                    COMPONENT,
                    "event_failed",
                    json!({
                        "request_id": context.request_id.clone(),
                        "kind": error.kind(),
                        "message": error.to_string(),
                        "detail": format!("{error:?}"),
                    }),
                );
                error_envelope(context)
            }
        }
    }

    fn process(
        &self,
        event: &CanonicalEvent,
        context: &ExecutionContext,
    ) -> Result<String, HandlerError> {
        let result = self.registry.dispatch(event, context)?;
        serde_json::to_string(&result)
            .map_err(|error| HandlerError::processing(format!("failed to serialize result: {error}")))
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

pub fn error_envelope(context: &ExecutionContext) -> ResponseEnvelope {
    json_response(
        500,
        &json!({
            "message": ERROR_RESPONSE_MESSAGE,
            "errorId": context.request_id,
        }),
    )
}
