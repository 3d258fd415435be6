//! Session continuation and permission enums.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a run relates to earlier sessions.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionMode {
    /// Start a fresh conversation.
    #[default]
    #[serde(alias = "query")]
    #[strum(to_string = "new", serialize = "query")]
    New,
    /// Continue the most recent session.
    Continue,
    /// Resume a specific session by id.
    Resume,
    /// Resume a specific session into a newly allocated session id.
    Fork,
}

impl SessionMode {
    /// Whether this mode needs a session id.
    pub fn requires_session_id(self) -> bool {
        matches!(self, Self::Resume | Self::Fork)
    }
}

/// Tool permission policy requested from the runtime.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PermissionMode {
    /// Prompt for every operation.
    Default,
    /// Auto-accept file edits only.
    AcceptEdits,
    /// No prompts at all.
    #[default]
    BypassPermissions,
    /// Plan first, then execute.
    Plan,
}

/// How the system prompt is changed for this run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SystemPromptMode {
    #[default]
    Default,
    Append,
    Custom,
}
