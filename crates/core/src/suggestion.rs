//! Quest suggestion status rules.
//!
//! A suggestion is decided exactly once: `pending` becomes either `approved`
//! (spawning one quest) or `rejected`. Decided suggestions are read-only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Approved => "approved",
            SuggestionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SuggestionStatus::Pending),
            "approved" => Ok(SuggestionStatus::Approved),
            "rejected" => Ok(SuggestionStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid suggestion status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }
}

impl TryFrom<String> for SuggestionStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error for a decision or edit on a suggestion that matched no pending row.
///
/// `current` is the status re-read after the guarded update (`None` when the
/// suggestion does not exist).
pub fn explain_not_pending(
    suggestion_id: EntityId,
    current: Option<SuggestionStatus>,
) -> CoreError {
    match current {
        None => CoreError::not_found("QuestSuggestion", suggestion_id),
        Some(status) => CoreError::Conflict(format!(
            "Quest suggestion {suggestion_id} was already {status}"
        )),
    }
}
