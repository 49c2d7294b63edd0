//! Event classification and routing.
//!
//! An event is classified into a kind tag, then the tag is looked up in a
//! [`RoutineRegistry`]. Unregistered kinds fall through to the registry's
//! fallback routine, so an unfamiliar event never fails dispatch by itself.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::contract::CanonicalEvent;
use crate::error::HandlerError;

pub const KIND_EXAMPLE: &str = "example";
pub const KIND_BATCH: &str = "batch";
pub const KIND_WEB: &str = "web";
pub const KIND_UNKNOWN: &str = "unknown";

pub const DEFAULT_ROUTINE_MESSAGE: &str = "Event processed by default handler";

/// Picks the kind tag for an event. First match wins:
/// explicit non-empty `type`, then a `Records` list (`batch`), then an
/// `httpMethod` (`web`), otherwise `unknown`.
pub fn classify_event(event: &CanonicalEvent) -> &str {
    if let Some(kind) = event.event_type().filter(|kind| !kind.is_empty()) {
        return kind;
    }

    // Queue and stream triggers deliver record batches without a `type`.
    if event.records().is_some() {
        return KIND_BATCH;
    }

    if event.http_method().is_some() {
        return KIND_WEB;
    }

    KIND_UNKNOWN
}

pub trait EventRoutine: Send + Sync {
    fn process(
        &self,
        event: &CanonicalEvent,
        context: &ExecutionContext,
    ) -> Result<Value, HandlerError>;
}

impl<F> EventRoutine for F
where
    F: Fn(&CanonicalEvent, &ExecutionContext) -> Result<Value, HandlerError> + Send + Sync,
{
    fn process(
        &self,
        event: &CanonicalEvent,
        context: &ExecutionContext,
    ) -> Result<Value, HandlerError> {
        self(event, context)
    }
}

/// Acknowledges the event and echoes it back unmodified.
pub fn default_routine(
    event: &CanonicalEvent,
    _context: &ExecutionContext,
) -> Result<Value, HandlerError> {
    Ok(json!({
        "message": DEFAULT_ROUTINE_MESSAGE,
        "eventReceived": event,
    }))
}

/// Mapping from kind tag to processing routine.
pub struct RoutineRegistry {
    routines: HashMap<String, Box<dyn EventRoutine>>,
    fallback: Box<dyn EventRoutine>,
}

impl RoutineRegistry {
    pub fn new() -> Self {
        Self {
            routines: HashMap::new(),
            fallback: Box::new(default_routine),
        }
    }

    /// Registers `routine` for `kind`, replacing any earlier registration.
    pub fn register(
        mut self,
        kind: impl Into<String>,
        routine: impl EventRoutine + 'static,
    ) -> Self {
        self.routines.insert(kind.into(), Box::new(routine));
        self
    }

    pub fn with_fallback(mut self, routine: impl EventRoutine + 'static) -> Self {
        self.fallback = Box::new(routine);
        self
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.routines.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.routines.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn resolve(&self, kind: &str) -> &dyn EventRoutine {
        self.routines
            .get(kind)
            .map(|routine| &**routine)
            .unwrap_or_else(|| &*self.fallback)
    }

    pub fn dispatch(
        &self,
        event: &CanonicalEvent,
        context: &ExecutionContext,
    ) -> Result<Value, HandlerError> {
        self.resolve(classify_event(event)).process(event, context)
    }
}

impl Default for RoutineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoutineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutineRegistry")
            .field("kinds", &self.kinds())
            .finish_non_exhaustive()
    }
}
