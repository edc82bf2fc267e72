//! Errors that are allowed to end a classification run.
//!
//! Everything else (transient poll failures, per-line inference failures)
//! is recovered where it happens and only logged.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Timeout waiting for Ollama server at {endpoint} (waited {waited:?})")]
    ServiceTimeout { endpoint: String, waited: Duration },

    #[error("Timeout waiting for model '{prefix}' at {endpoint} (waited {waited:?})")]
    ModelTimeout {
        prefix: String,
        endpoint: String,
        waited: Duration,
    },

    #[error("Path {} is neither a file nor a directory", .0.display())]
    InvalidPath(PathBuf),
}
