use restsnap_config::ConfigError;
use restsnap_core::{CaseName, CoreError};
use restsnap_store::StoreError;
use thiserror::Error;

/// Errors that abort a run. Per-case assertion failures are not errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid request spec for case '{case}': {message}")]
    InvalidSpec { case: CaseName, message: String },

    #[error("Invalid status/header sample for case '{case}': {message}")]
    InvalidSample { case: CaseName, message: String },

    #[error("Failed to decode response body for case '{case}': {message}")]
    Decode { case: CaseName, message: String },

    #[error("Request for case '{case}' timed out: {message}")]
    Timeout { case: CaseName, message: String },

    #[error("HTTP error for case '{case}': {source}")]
    Http {
        case: CaseName,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl RuntimeError {
    pub fn invalid_spec(case: &CaseName, message: impl Into<String>) -> Self {
        Self::InvalidSpec { case: case.clone(), message: message.into() }
    }

    pub fn invalid_sample(case: &CaseName, message: impl Into<String>) -> Self {
        Self::InvalidSample { case: case.clone(), message: message.into() }
    }

    /// Classify a transport failure for one case
    pub fn http(case: &CaseName, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { case: case.clone(), message: err.to_string() }
        } else {
            Self::Http { case: case.clone(), source: err }
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
