use restsnap_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Add conversion from StoreError to CoreError
impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(e) => e,
            StoreError::CreateDir { path, source } => {
                CoreError::Io(format!("Failed to create directory {}: {}", path, source))
            }
            StoreError::Io(e) => CoreError::Io(e.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
