use thiserror::Error;

/// Errors that abort a conversion or upload run, or describe why a single
/// record could not be delivered.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IfirmaError {
    /// Reading or writing a local file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV input could not be read at all.
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON (de)serialization of invoice records failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required configuration value is missing.
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Builder encountered invalid or missing fields.
    #[error("builder error: {0}")]
    Builder(String),

    /// A record read from disk failed validation and was not sent.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The request never produced an HTTP response.
    #[error("network failure: {0}")]
    Network(String),

    /// The API answered, but rejected the record.
    #[error("API rejected the invoice (HTTP {status}): {body}")]
    ApiRejection { status: u16, body: String },
}

impl IfirmaError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "Kontrahent.Nazwa").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
