//! Score definitions: the static weight table consulted for every event.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventType, ProjectId};

/// Event type emitted by connectivity tests on the event stream.
///
/// Records carrying it are acknowledged without any lookup or score change.
pub const TEST_EVENT_TYPE: &str = "_test.event_stream";

/// Weights written by the seeder, in write order.
pub const DEFAULT_SCORE_WEIGHTS: [(&str, i64); 15] = [
    ("_email.click", 50),
    ("_email.open", 10),
    ("_email.delivered", 2),
    ("_email.hardbounce", -1000),
    ("_email.complaint", -1000),
    ("_email.unsubscribe", -500),
    ("_SMS.SUCCESS", 2),
    ("_SMS.OPTOUT", -500),
    ("_campaign.send", 2),
    ("_campaign.opened_notification", 50),
    ("_campaign.received_foreground", 2),
    ("_campaign.received_background", 2),
    ("_session.start", 2),
    ("_userauth.sign_up", 50),
    ("_monetization.purchase", 100),
];

/// Weight of one event type within one project.
///
/// Keyed by `(event_type, project_id)`, so the same event type may carry
/// different weights in different projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDefinition {
    pub event_type: EventType,
    pub project_id: ProjectId,
    /// Signed amount added to a user's score per event.
    pub score_offset: i64,
}

impl ScoreDefinition {
    pub fn new(event_type: EventType, project_id: ProjectId, score_offset: i64) -> Self {
        Self {
            event_type,
            project_id,
            score_offset,
        }
    }

    /// Builds the default weight table for a project.
    pub fn defaults_for(project_id: &ProjectId) -> Vec<ScoreDefinition> {
        DEFAULT_SCORE_WEIGHTS
            .iter()
            .map(|(event_type, offset)| {
                ScoreDefinition::new(
                    EventType::from_static(event_type),
                    project_id.clone(),
                    *offset,
                )
            })
            .collect()
    }

    /// Returns the lookup key of this definition.
    pub fn key(&self) -> (EventType, ProjectId) {
        (self.event_type.clone(), self.project_id.clone())
    }
}

/// Returns true when the event type is the connectivity-test sentinel.
pub fn is_test_event(event_type: &str) -> bool {
    event_type == TEST_EVENT_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn project() -> ProjectId {
        ProjectId::new("proj-1").unwrap()
    }

    #[test]
    fn defaults_contain_fifteen_definitions() {
        assert_eq!(ScoreDefinition::defaults_for(&project()).len(), 15);
    }

    #[test]
    fn default_event_types_are_unique() {
        let keys: HashSet<_> = ScoreDefinition::defaults_for(&project())
            .iter()
            .map(ScoreDefinition::key)
            .collect();
        assert_eq!(keys.len(), 15);
    }

    #[test]
    fn defaults_target_the_given_project() {
        let defs = ScoreDefinition::defaults_for(&project());
        assert!(defs.iter().all(|d| d.project_id == project()));
    }

    #[test]
    fn email_click_weighs_fifty() {
        let defs = ScoreDefinition::defaults_for(&project());
        let click = defs
            .iter()
            .find(|d| d.event_type.as_str() == "_email.click")
            .unwrap();
        assert_eq!(click.score_offset, 50);
    }

    #[test]
    fn negative_weights_are_kept() {
        let defs = ScoreDefinition::defaults_for(&project());
        let bounce = defs
            .iter()
            .find(|d| d.event_type.as_str() == "_email.hardbounce")
            .unwrap();
        assert_eq!(bounce.score_offset, -1000);
    }

    #[test]
    fn sentinel_is_recognized() {
        assert!(is_test_event("_test.event_stream"));
        assert!(!is_test_event("_email.click"));
    }
}
