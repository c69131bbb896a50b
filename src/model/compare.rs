//! Reconciliation records.

use serde::{Deserialize, Serialize};

use super::game::CompletionStatus;
use super::source::ConsoleSource;
use super::ConsoleId;

/// Outcome of reconciling one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareStatus {
    /// Present on both sides with the same status
    Ok,
    /// Known to the authoritative source only
    NotInLocal,
    /// Known locally only
    NotInDatabase,
    /// Present on both sides with different statuses
    CompletionStatusDifferent,
}

/// Classified comparison of one game. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRecord {
    pub source: ConsoleSource,
    pub console_id: ConsoleId,
    pub console_name: String,
    pub name: String,
    pub status: CompareStatus,
    #[serde(default, alias = "playniteStatus")]
    pub local_status: Option<CompletionStatus>,
    #[serde(default, alias = "databaseStatus")]
    pub remote_status: Option<CompletionStatus>,
}
