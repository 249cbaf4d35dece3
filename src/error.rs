use thiserror::Error;

/// Failure talking to the REST API. Every request is a single attempt.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not signed in")]
    Unauthorized,
}

impl ApiError {
    /// Short message suitable for showing next to the failed widget.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Nuk u arrit lidhja me serverin".to_string(),
            ApiError::Status { status: 404, .. } => "Nuk u gjet".to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) => "Përgjigje e pavlefshme nga serveri".to_string(),
            ApiError::Unauthorized => "Ju lutem identifikohuni".to_string(),
        }
    }
}

/// Failure writing to a key-value store. Reads never fail: missing or corrupt
/// entries are treated as absent.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,

    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
