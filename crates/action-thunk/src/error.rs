// error.rs — Error types for action thunks.
//
// Two families live here:
// - `WorkFault` is what wrapped work fails with. It is the only fault kind
//   the lifecycle layer knows about; it gets reported in FAILED and then
//   handed back to the caller (or swallowed when suppression is on).
// - `ThunkError` covers everything around the lifecycle: bad operation
//   names, sink I/O, config parsing.

use serde_json::{json, Value};
use thiserror::Error;

/// Boxed error used as the optional cause of a [`WorkFault`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised outside the lifecycle contract itself.
#[derive(Debug, Error)]
pub enum ThunkError {
    /// Operation names prefix every identifier, so an empty one is rejected.
    #[error("operation name must not be empty")]
    EmptyName,

    /// A file I/O operation failed (sink or config file).
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize a notification.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The config file is not valid TOML for [`crate::ThunkConfig`].
    #[error("invalid config at {path}: {source}")]
    ConfigError {
        path: String,
        source: toml::de::Error,
    },
}

/// A fault produced by wrapped work, either returned synchronously or as the
/// rejection of its deferred value.
///
/// Faults carry a human-readable message, optional structured `data` that is
/// forwarded into the FAILED payload, and optionally the underlying error.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct WorkFault {
    message: String,
    data: Option<Value>,
    #[source]
    source: Option<BoxError>,
}

impl WorkFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            source: None,
        }
    }

    /// Wrap an arbitrary error, keeping it as the fault's source.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            data: None,
            source: Some(Box::new(err)),
        }
    }

    /// Attach structured data and return self (builder pattern).
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// The JSON form used as the FAILED notification payload.
    ///
    /// `{"message": "..."}`, plus `"data"` when structured data was attached.
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({ "message": self.message });
        if let (Some(data), Value::Object(map)) = (&self.data, &mut payload) {
            map.insert("data".to_string(), data.clone());
        }
        payload
    }
}

impl From<&str> for WorkFault {
    fn from(message: &str) -> Self {
        WorkFault::new(message)
    }
}

impl From<String> for WorkFault {
    fn from(message: String) -> Self {
        WorkFault::new(message)
    }
}

impl From<std::io::Error> for WorkFault {
    fn from(err: std::io::Error) -> Self {
        WorkFault::from_error(err)
    }
}

impl From<serde_json::Error> for WorkFault {
    fn from(err: serde_json::Error) -> Self {
        WorkFault::from_error(err)
    }
}
