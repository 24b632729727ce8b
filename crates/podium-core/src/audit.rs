//! Audit decisions for publish calls.
//!
//! The publisher never writes audit entries itself. Callers pass the request
//! and its result here and hand any record to their [`AuditLog`].
//!
//! [`AuditLog`]: podium_state::AuditLog

use chrono::Utc;
use podium_state::AuditRecord;

use crate::domain::{PublishCode, PublishRequest, PublishResult};

pub const ACTION_PUBLISHED: &str = "ranking.published";
pub const ACTION_PUBLISHED_WITH_OVERRIDE: &str = "ranking.published_with_override";
pub const ACTION_PUBLISH_REFUSED: &str = "ranking.publish_refused";

/// The audit record `result` calls for, if any.
///
/// Publications and gate refusals are recorded. Conflicts and store errors are
/// transient and leave no trail.
pub fn audit_record_for(request: &PublishRequest, result: &PublishResult) -> Option<AuditRecord> {
    let (action, override_reason) = match result.code {
        PublishCode::Published if result.overridden => (
            ACTION_PUBLISHED_WITH_OVERRIDE,
            request.trimmed_reason().map(str::to_string),
        ),
        PublishCode::Published => (ACTION_PUBLISHED, None),
        PublishCode::MissingVotes | PublishCode::OverrideReasonRequired => {
            (ACTION_PUBLISH_REFUSED, None)
        }
        PublishCode::PublishConflict | PublishCode::StoreError => return None,
    };

    Some(AuditRecord {
        action: action.to_string(),
        hackathon_id: request.hackathon_id,
        actor_id: request.publisher_id,
        version: result.version,
        overridden: result.overridden,
        override_reason,
        outcome: result.code.as_str().to_string(),
        recorded_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_state::{HackathonId, UserId};

    fn request() -> PublishRequest {
        PublishRequest::new(HackathonId(3), UserId(11))
    }

    #[test]
    fn plain_publication_is_recorded() {
        let record = audit_record_for(&request(), &PublishResult::published(2, false)).unwrap();
        assert_eq!(record.action, ACTION_PUBLISHED);
        assert_eq!(record.version, Some(2));
        assert_eq!(record.actor_id, UserId(11));
        assert_eq!(record.outcome, "PUBLISHED");
        assert_eq!(record.override_reason, None);
    }

    #[test]
    fn override_publication_keeps_trimmed_reason() {
        let req = request().with_override("  judge left early ");
        let record = audit_record_for(&req, &PublishResult::published(1, true)).unwrap();
        assert_eq!(record.action, ACTION_PUBLISHED_WITH_OVERRIDE);
        assert!(record.overridden);
        assert_eq!(record.override_reason.as_deref(), Some("judge left early"));
    }

    #[test]
    fn refusals_are_recorded() {
        let record = audit_record_for(
            &request(),
            &PublishResult::failed(PublishCode::OverrideReasonRequired),
        )
        .unwrap();
        assert_eq!(record.action, ACTION_PUBLISH_REFUSED);
        assert_eq!(record.outcome, "OVERRIDE_REASON_REQUIRED");
        assert_eq!(record.version, None);
    }

    #[test]
    fn transient_failures_are_not_recorded() {
        assert!(audit_record_for(
            &request(),
            &PublishResult::failed(PublishCode::PublishConflict)
        )
        .is_none());
        assert!(audit_record_for(&request(), &PublishResult::store_error("timeout")).is_none());
    }
}
