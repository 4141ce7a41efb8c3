use serde::Serialize;
use thiserror::Error;

/// Unified error type for coursedraft operations
#[derive(Debug, Error)]
pub enum DraftError {
    // Serialization errors (snapshots, recovery payloads)
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    // Local key/value store errors
    #[error("local store I/O error: {0}")]
    Store(#[from] std::io::Error),

    // Remote persistence errors
    #[error("failed to persist course: {0}")]
    Persist(String),

    #[error("failed to persist modules for course '{course_id}': {message}")]
    PersistModules {
        course_id: String,
        message: String,
    },

    #[error("failed to load course '{course_id}': {message}")]
    Load {
        course_id: String,
        message: String,
    },

    // Validation errors (refused before the persist call is made)
    #[error("validation failed: {0}")]
    Validation(String),

    // Engine state errors
    #[error("a save operation is already in flight")]
    SaveInFlight,
}

/// Result type alias for coursedraft operations
pub type Result<T> = std::result::Result<T, DraftError>;

/// A serializable representation of DraftError for IPC (e.g., Tauri)
#[derive(Debug, Clone, Serialize)]
pub struct SerializableError {
    /// Error kind/variant name
    pub kind: String,
    /// Human-readable error message
    pub message: String,
}

impl From<&DraftError> for SerializableError {
    fn from(err: &DraftError) -> Self {
        let kind = match err {
            DraftError::Serialize(_) => "Serialize",
            DraftError::Store(_) => "Store",
            DraftError::Persist(_) => "Persist",
            DraftError::PersistModules { .. } => "PersistModules",
            DraftError::Load { .. } => "Load",
            DraftError::Validation(_) => "Validation",
            DraftError::SaveInFlight => "SaveInFlight",
        }
        .to_string();

        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<DraftError> for SerializableError {
    fn from(err: DraftError) -> Self {
        SerializableError::from(&err)
    }
}

impl DraftError {
    /// Convert to a serializable representation for IPC
    pub fn to_serializable(&self) -> SerializableError {
        SerializableError::from(self)
    }

    /// Whether this error is transient and worth retrying (remote persistence
    /// failures). Validation and state errors are not retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DraftError::Persist(_) | DraftError::PersistModules { .. }
        )
    }
}
