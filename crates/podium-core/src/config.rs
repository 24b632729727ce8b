//! Publisher configuration.

use crate::domain::error::{PodiumError, Result};

/// Environment variable overriding [`PublisherConfig::max_attempts`].
pub const MAX_ATTEMPTS_ENV: &str = "PODIUM_PUBLISH_MAX_ATTEMPTS";

/// Default number of snapshot insert attempts per publish call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Tuning for [`SnapshotPublisher`](crate::SnapshotPublisher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherConfig {
    max_attempts: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PublisherConfig {
    /// Total insert attempts, including the first, before giving up with
    /// `PUBLISH_CONFLICT`. Always at least 1.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn with_max_attempts(max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(PodiumError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_attempts })
    }

    /// Read the configuration from the environment, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_var(std::env::var(MAX_ATTEMPTS_ENV))
    }

    fn from_var(var: std::result::Result<String, std::env::VarError>) -> Result<Self> {
        match var {
            Ok(raw) => Self::with_max_attempts(parse_max_attempts(&raw)?),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(PodiumError::Config(format!("{}: {}", MAX_ATTEMPTS_ENV, e))),
        }
    }
}

fn parse_max_attempts(raw: &str) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|e| {
        PodiumError::Config(format!(
            "{} must be a positive integer, got {:?}: {}",
            MAX_ATTEMPTS_ENV, raw, e
        ))
    })
}
