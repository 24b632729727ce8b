//! Error types for podium-state

use thiserror::Error;

/// Errors raised by the store traits and their backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("database connection failed: {0}")]
    Connection(String),

    /// Schema setup error
    #[error("schema setup failed: {0}")]
    SchemaSetup(String),

    /// Any other backend failure (query, transport, decoding)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Payload (de)serialization error
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Another writer already holds this (hackathon, version) slot
    #[error("snapshot version {version} already exists for hackathon {hackathon_id}")]
    VersionConflict { hackathon_id: i64, version: u32 },

    /// Evaluation score outside the accepted range
    #[error("score {score} is outside the accepted range 0..=10")]
    InvalidScore { score: i64 },

    /// Lookup of a specific snapshot version failed
    #[error("snapshot version {version} not found for hackathon {hackathon_id}")]
    SnapshotNotFound { hackathon_id: i64, version: u32 },
}

impl StorageError {
    /// True when the error is a lost version race rather than a backend fault.
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, StorageError::VersionConflict { .. })
    }
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_conflict_is_classified() {
        let err = StorageError::VersionConflict {
            hackathon_id: 7,
            version: 3,
        };
        assert!(err.is_version_conflict());
        assert!(err.to_string().contains("version 3"));
        assert!(err.to_string().contains("hackathon 7"));

        let err = StorageError::Backend("connection reset".to_string());
        assert!(!err.is_version_conflict());
    }
}
