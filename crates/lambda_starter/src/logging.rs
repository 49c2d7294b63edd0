use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line; CloudWatch adds its own ingestion time.
    Json,
    /// Human-readable lines for local development.
    Pretty,
}

/// Installs the global subscriber. Filtering follows `RUST_LOG`, defaulting
/// to `info`. Calling this twice keeps the first subscriber.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder
            .json()
            .with_current_span(false)
            .without_time()
            .try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };
}

pub fn log_info(component: &str, event: &str, details: Value) {
    tracing::info!(component, event, %details, "{event}");
}

pub fn log_warning(component: &str, event: &str, details: Value) {
    tracing::warn!(component, event, %details, "{event}");
}

pub fn log_error(component: &str, event: &str, details: Value) {
    tracing::error!(component, event, %details, "{event}");
}
