//! Quest status state machine.
//!
//! Quests move `active -> in_progress -> pending -> completed`. Admins may
//! send a `pending` quest back to `in_progress`; rejecting an `in_progress`
//! quest is a no-op that leaves it `in_progress`. Nothing leaves `completed`.
//!
//! The database layer applies transitions with a conditional `UPDATE` guarded
//! by [`QuestAction::allowed_from`]; when that update matches zero rows the
//! handler asks [`explain_no_match`] which error to report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

/// Lifecycle status of a quest, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    /// Assigned, not started.
    Active,
    /// The seeker is working on it.
    InProgress,
    /// The seeker marked it done; awaiting admin approval.
    Pending,
    /// Approved and rewarded. Terminal.
    Completed,
}

impl QuestStatus {
    pub const ALL: [QuestStatus; 4] = [
        QuestStatus::Active,
        QuestStatus::InProgress,
        QuestStatus::Pending,
        QuestStatus::Completed,
    ];

    /// Statuses shown on a seeker's quest board.
    pub const OPEN: [QuestStatus; 3] = [
        QuestStatus::Active,
        QuestStatus::InProgress,
        QuestStatus::Pending,
    ];

    /// The database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestStatus::Active => "active",
            QuestStatus::InProgress => "in_progress",
            QuestStatus::Pending => "pending",
            QuestStatus::Completed => "completed",
        }
    }

    /// Whether quests in this status count towards the assignee's balance.
    pub fn is_rewarded(self) -> bool {
        self == QuestStatus::Completed
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid quest status '{s}'. Must be one of: active, in_progress, pending, completed"
                ))
            })
    }
}

impl TryFrom<String> for QuestStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A lifecycle command issued against a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestAction {
    Start,
    Complete,
    Approve,
    Reject,
}

impl QuestAction {
    /// Statuses from which this action may be applied.
    pub fn allowed_from(self) -> &'static [QuestStatus] {
        match self {
            QuestAction::Start => &[QuestStatus::Active, QuestStatus::InProgress],
            QuestAction::Complete => &[QuestStatus::Active, QuestStatus::InProgress],
            QuestAction::Approve => &[QuestStatus::Pending],
            QuestAction::Reject => &[QuestStatus::Pending, QuestStatus::InProgress],
        }
    }

    /// Status the quest ends up in.
    pub fn target(self) -> QuestStatus {
        match self {
            QuestAction::Start => QuestStatus::InProgress,
            QuestAction::Complete => QuestStatus::Pending,
            QuestAction::Approve => QuestStatus::Completed,
            QuestAction::Reject => QuestStatus::InProgress,
        }
    }

    /// Whether the action is tied to the quest's assignee.
    pub fn requires_assignee(self) -> bool {
        !matches!(self, QuestAction::Reject)
    }

    pub fn verb(self) -> &'static str {
        match self {
            QuestAction::Start => "start",
            QuestAction::Complete => "complete",
            QuestAction::Approve => "approve",
            QuestAction::Reject => "reject",
        }
    }

    /// `allowed_from` as text, for binding to `status = ANY($n)`.
    pub fn allowed_from_str(self) -> Vec<&'static str> {
        self.allowed_from().iter().map(|s| s.as_str()).collect()
    }

    /// Check a transition against the state machine.
    pub fn validate_from(self, current: QuestStatus) -> Result<QuestStatus, CoreError> {
        if self.allowed_from().contains(&current) {
            Ok(self.target())
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot {} a quest that is {current}",
                self.verb()
            )))
        }
    }
}

/// The lifecycle actions applied by a single guarded `UPDATE`.
///
/// Approval also credits stars and runs in its own transaction, so it is
/// not one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    Start,
    Complete,
    Reject,
}

impl GuardedAction {
    pub const ALL: [GuardedAction; 3] = [
        GuardedAction::Start,
        GuardedAction::Complete,
        GuardedAction::Reject,
    ];
}

impl From<GuardedAction> for QuestAction {
    fn from(action: GuardedAction) -> Self {
        match action {
            GuardedAction::Start => QuestAction::Start,
            GuardedAction::Complete => QuestAction::Complete,
            GuardedAction::Reject => QuestAction::Reject,
        }
    }
}

/// The fields of a quest that decide whether a transition can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestGuardState {
    pub status: QuestStatus,
    pub assigned_to: Option<EntityId>,
}

/// Translate a zero-row conditional update into the error the caller sees.
///
/// `current` is the quest as re-read after the guarded update matched
/// nothing (`None` when the quest does not exist).
///
/// - missing quest: `NotFound`
/// - start/complete by someone other than the assignee: `NotFound`, the
///   quest does not exist from that seeker's point of view
/// - approve for someone other than the assignee: `Conflict`
/// - wrong status: `Conflict`
pub fn explain_no_match(
    action: QuestAction,
    quest_id: EntityId,
    seeker_id: Option<EntityId>,
    current: Option<QuestGuardState>,
) -> CoreError {
    let Some(current) = current else {
        return CoreError::not_found("Quest", quest_id);
    };

    if action.requires_assignee() && current.assigned_to != seeker_id {
        let seeker = seeker_id.map(|id| id.to_string()).unwrap_or_default();
        return match action {
            QuestAction::Approve => CoreError::Conflict(format!(
                "Quest {quest_id} is not assigned to seeker {seeker}"
            )),
            _ => CoreError::NotFound {
                entity: "Quest",
                id: format!("{quest_id} (assigned to seeker {seeker})"),
            },
        };
    }

    match action.validate_from(current.status) {
        Err(err) => err,
        // The guard would have matched; the row changed underneath us.
        Ok(_) => CoreError::Conflict(format!(
            "Quest {quest_id} changed concurrently, retry the {} request",
            action.verb()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(status: QuestStatus, assigned_to: Option<EntityId>) -> QuestGuardState {
        QuestGuardState {
            status,
            assigned_to,
        }
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in QuestStatus::ALL {
            assert_eq!(status.as_str().parse::<QuestStatus>().unwrap(), status);
        }
        assert!("done".parse::<QuestStatus>().is_err());
    }

    #[test]
    fn test_status_displays_snake_case() {
        assert_eq!(QuestStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_only_completed_is_rewarded() {
        let rewarded: Vec<_> = QuestStatus::ALL
            .into_iter()
            .filter(|s| s.is_rewarded())
            .collect();
        assert_eq!(rewarded, vec![QuestStatus::Completed]);
    }

    #[test]
    fn test_happy_path_transitions() {
        assert_eq!(
            QuestAction::Start.validate_from(QuestStatus::Active).unwrap(),
            QuestStatus::InProgress
        );
        assert_eq!(
            QuestAction::Complete
                .validate_from(QuestStatus::InProgress)
                .unwrap(),
            QuestStatus::Pending
        );
        assert_eq!(
            QuestAction::Approve.validate_from(QuestStatus::Pending).unwrap(),
            QuestStatus::Completed
        );
    }

    #[test]
    fn test_reject_sends_pending_back_to_in_progress() {
        assert_eq!(
            QuestAction::Reject.validate_from(QuestStatus::Pending).unwrap(),
            QuestStatus::InProgress
        );
        assert_eq!(
            QuestAction::Reject
                .validate_from(QuestStatus::InProgress)
                .unwrap(),
            QuestStatus::InProgress
        );
    }

    #[test]
    fn test_nothing_leaves_completed() {
        for action in [
            QuestAction::Start,
            QuestAction::Complete,
            QuestAction::Approve,
            QuestAction::Reject,
        ] {
            let err = action.validate_from(QuestStatus::Completed).unwrap_err();
            assert!(matches!(err, CoreError::Conflict(_)), "{action:?}");
        }
    }

    #[test]
    fn test_approve_requires_pending() {
        assert!(QuestAction::Approve
            .validate_from(QuestStatus::Active)
            .is_err());
        assert!(QuestAction::Approve
            .validate_from(QuestStatus::InProgress)
            .is_err());
    }

    #[test]
    fn test_cannot_restart_pending_quest() {
        assert!(QuestAction::Start.validate_from(QuestStatus::Pending).is_err());
    }

    #[test]
    fn test_guarded_actions_exclude_approve() {
        let actions: Vec<QuestAction> = GuardedAction::ALL.into_iter().map(Into::into).collect();
        assert_eq!(
            actions,
            vec![QuestAction::Start, QuestAction::Complete, QuestAction::Reject]
        );
    }

    #[test]
    fn test_explain_missing_quest_is_not_found() {
        let err = explain_no_match(
            QuestAction::Start,
            EntityId::new_v4(),
            Some(EntityId::new_v4()),
            None,
        );
        assert!(matches!(err, CoreError::NotFound { entity: "Quest", .. }));
    }

    #[test]
    fn test_explain_start_by_other_seeker_is_not_found() {
        let owner = EntityId::new_v4();
        let err = explain_no_match(
            QuestAction::Start,
            EntityId::new_v4(),
            Some(EntityId::new_v4()),
            Some(state(QuestStatus::Active, Some(owner))),
        );
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_explain_approve_by_other_seeker_is_conflict() {
        let owner = EntityId::new_v4();
        let err = explain_no_match(
            QuestAction::Approve,
            EntityId::new_v4(),
            Some(EntityId::new_v4()),
            Some(state(QuestStatus::Pending, Some(owner))),
        );
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn test_explain_wrong_status_is_conflict() {
        let owner = EntityId::new_v4();
        let err = explain_no_match(
            QuestAction::Approve,
            EntityId::new_v4(),
            Some(owner),
            Some(state(QuestStatus::Completed, Some(owner))),
        );
        match err {
            CoreError::Conflict(msg) => assert!(msg.contains("completed")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_explain_reject_ignores_assignee() {
        let err = explain_no_match(
            QuestAction::Reject,
            EntityId::new_v4(),
            None,
            Some(state(QuestStatus::Completed, Some(EntityId::new_v4()))),
        );
        assert!(matches!(err, CoreError::Conflict(_)));
    }
}
