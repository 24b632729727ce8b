//! Publish requests and their result codes.

use podium_state::{HackathonId, UserId};
use serde::{Deserialize, Serialize};

/// Inputs to a publish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub hackathon_id: HackathonId,
    /// Publish even if some judge has not scored some team.
    pub override_missing_votes: bool,
    pub publisher_id: UserId,
    /// Required (non-blank) when the override is actually applied.
    pub override_reason: Option<String>,
}

impl PublishRequest {
    pub fn new(hackathon_id: HackathonId, publisher_id: UserId) -> Self {
        Self {
            hackathon_id,
            override_missing_votes: false,
            publisher_id,
            override_reason: None,
        }
    }

    /// Request the missing-votes override with the given justification.
    pub fn with_override(mut self, reason: impl Into<String>) -> Self {
        self.override_missing_votes = true;
        self.override_reason = Some(reason.into());
        self
    }

    /// Request the override without a justification.
    pub fn with_override_flag(mut self) -> Self {
        self.override_missing_votes = true;
        self
    }

    /// The override reason with surrounding whitespace removed, if any is left.
    pub fn trimmed_reason(&self) -> Option<&str> {
        self.override_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Outcome code of a publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishCode {
    Published,
    /// Completeness gate failed and no override was requested.
    MissingVotes,
    /// Override requested without a justification.
    OverrideReasonRequired,
    /// Lost the version race more times than the retry budget allows.
    PublishConflict,
    /// A read or write collaborator failed.
    StoreError,
}

impl PublishCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishCode::Published => "PUBLISHED",
            PublishCode::MissingVotes => "MISSING_VOTES",
            PublishCode::OverrideReasonRequired => "OVERRIDE_REASON_REQUIRED",
            PublishCode::PublishConflict => "PUBLISH_CONFLICT",
            PublishCode::StoreError => "STORE_ERROR",
        }
    }

    /// Failures the caller should surface as a prompt to override with a reason.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            PublishCode::MissingVotes | PublishCode::OverrideReasonRequired
        )
    }

    /// Transient failures that are safe to retry unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishCode::PublishConflict | PublishCode::StoreError)
    }
}

impl std::fmt::Display for PublishCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a publish call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub success: bool,
    pub code: PublishCode,
    /// Allocated version, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Whether the missing-votes override was applied to the stored snapshot.
    pub overridden: bool,
    /// Collaborator error message for `STORE_ERROR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PublishResult {
    pub fn published(version: u32, overridden: bool) -> Self {
        Self {
            success: true,
            code: PublishCode::Published,
            version: Some(version),
            overridden,
            detail: None,
        }
    }

    pub fn failed(code: PublishCode) -> Self {
        Self {
            success: false,
            code,
            version: None,
            overridden: false,
            detail: None,
        }
    }

    pub fn store_error(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::failed(PublishCode::StoreError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_screaming_snake_case() {
        let json = serde_json::to_string(&PublishCode::OverrideReasonRequired).unwrap();
        assert_eq!(json, "\"OVERRIDE_REASON_REQUIRED\"");
        assert_eq!(PublishCode::MissingVotes.to_string(), "MISSING_VOTES");
    }

    #[test]
    fn code_classification() {
        assert!(PublishCode::MissingVotes.is_actionable());
        assert!(PublishCode::OverrideReasonRequired.is_actionable());
        assert!(PublishCode::PublishConflict.is_retryable());
        assert!(PublishCode::StoreError.is_retryable());
        assert!(!PublishCode::Published.is_actionable());
        assert!(!PublishCode::Published.is_retryable());
    }

    #[test]
    fn blank_reason_is_treated_as_absent() {
        let req = PublishRequest::new(HackathonId(1), UserId(2)).with_override("   ");
        assert_eq!(req.trimmed_reason(), None);

        let req = PublishRequest::new(HackathonId(1), UserId(2)).with_override("  late judge ");
        assert_eq!(req.trimmed_reason(), Some("late judge"));
    }

    #[test]
    fn store_error_carries_detail() {
        let result = PublishResult::store_error("connection reset");
        assert!(!result.success);
        assert_eq!(result.code, PublishCode::StoreError);
        assert_eq!(result.detail.as_deref(), Some("connection reset"));
        assert_eq!(result.version, None);
    }
}
