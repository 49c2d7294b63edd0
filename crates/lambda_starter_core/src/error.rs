use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised while loading or processing an event.
///
/// All of these are recovered at the handler boundary and turned into a
/// generic 500 envelope; the variant only matters for logging.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("no `{field}` provided for processing")]
    MissingInput { field: &'static str },

    #[error("event file \"{name}\" not found in events directory")]
    NotFound { name: String },

    #[error("failed to load test event \"{name}\": {source}")]
    LoadError {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    Processing(String),
}

impl HandlerError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } => "MissingInput",
            Self::NotFound { .. } => "NotFound",
            Self::LoadError { .. } => "LoadError",
            Self::Processing(_) => "ProcessingError",
        }
    }
}
