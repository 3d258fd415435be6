//! The full conversation: raw buffer plus a parsed view.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::metrics::{
    first_init, first_result, ModelUsageSummary, RunMetrics, SessionSnapshot, UsageTotals,
};
use crate::timeline::{reconstruct_turns, Turn};
use crate::types::{McpServerStatus, Message};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullOutput {
    /// The filtered buffer, verbatim.
    pub messages: Vec<Message>,
    pub parsed: ParsedSession,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSession {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<InitInfo>,
    pub timeline: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    pub tools: Vec<String>,
    pub mcp_servers: Vec<McpServerStatus>,
}

/// Like the summary's metrics and usage, without conversation counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBlock {
    pub success: bool,
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub metrics: RunMetrics,
    pub usage: UsageTotals,
    pub model_usage: BTreeMap<String, ModelUsageSummary>,
}

impl FullOutput {
    pub fn from_messages(messages: &[Message]) -> Self {
        let snapshot = SessionSnapshot::from_messages(messages);
        let init = first_init(messages).map(|system| InitInfo {
            model: system.model.clone(),
            permission_mode: system.permission_mode.clone(),
            cwd: system.cwd.clone(),
            tools: system.tools.clone().unwrap_or_default(),
            mcp_servers: system.mcp_servers.clone().unwrap_or_default(),
        });
        let result = first_result(messages).map(|_| ResultBlock {
            success: snapshot.success,
            text: snapshot.result.clone(),
            error_type: snapshot.error_type.clone(),
            metrics: snapshot.metrics,
            usage: snapshot.usage.totals,
            model_usage: snapshot.usage.per_model.clone(),
        });

        Self {
            messages: messages.to_vec(),
            parsed: ParsedSession {
                session_id: snapshot.session_id,
                init,
                timeline: reconstruct_turns(messages),
                result,
            },
        }
    }
}
