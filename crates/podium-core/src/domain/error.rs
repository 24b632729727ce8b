//! Domain-level error taxonomy for Podium.
//!
//! Publish refusals are not errors: they are [`PublishCode`] values inside a
//! successful `Result`. `PodiumError` covers collaborator and internal
//! failures only.
//!
//! [`PublishCode`]: crate::domain::PublishCode

use podium_state::StorageError;

/// Podium domain errors.
#[derive(Debug, thiserror::Error)]
pub enum PodiumError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("payload digest mismatch for hackathon {hackathon_id} v{version}: expected {expected}, got {actual}")]
    DigestMismatch {
        hackathon_id: i64,
        version: u32,
        expected: String,
        actual: String,
    },

    #[error("snapshot history of hackathon {hackathon_id} is inconsistent at v{version}: {detail}")]
    InconsistentHistory {
        hackathon_id: i64,
        version: u32,
        detail: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for Podium domain operations.
pub type Result<T> = std::result::Result<T, PodiumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_wraps_message() {
        let err = PodiumError::from(StorageError::Backend("connection refused".to_string()));
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_digest_mismatch_error() {
        let err = PodiumError::DigestMismatch {
            hackathon_id: 3,
            version: 2,
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
        assert!(msg.contains("v2"));
    }
}
