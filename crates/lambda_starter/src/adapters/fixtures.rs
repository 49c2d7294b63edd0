use std::io::ErrorKind;
use std::path::{Component, Path};

use lambda_starter_core::contract::CanonicalEvent;
use lambda_starter_core::error::HandlerError;
use serde_json::Value;

pub const DEFAULT_FIXTURE: &str = "example-event.json";

/// Reads `<events_dir>/<name>` and parses it as a canonical event.
///
/// Names that would escape `events_dir` are reported as not found.
pub async fn load_fixture(
    events_dir: &Path,
    name: Option<&str>,
) -> Result<CanonicalEvent, HandlerError> {
    let name = name.unwrap_or(DEFAULT_FIXTURE);
    if !is_plain_file_name(name) {
        return Err(HandlerError::NotFound {
            name: name.to_string(),
        });
    }

    let raw = tokio::fs::read_to_string(events_dir.join(name))
        .await
        .map_err(|error| match error.kind() {
            ErrorKind::NotFound => HandlerError::NotFound {
                name: name.to_string(),
            },
            _ => HandlerError::LoadError {
                name: name.to_string(),
                source: Box::new(error),
            },
        })?;

    let value: Value = serde_json::from_str(&raw).map_err(|error| HandlerError::LoadError {
        name: name.to_string(),
        source: Box::new(error),
    })?;
    Ok(CanonicalEvent::new(value))
}

/// Exactly one normal path component: no separators, `.`, `..` or roots.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
