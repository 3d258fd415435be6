//! Metrics-oriented summary of a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::{
    first_init, ConversationStats, DeniedTool, ModelUsageSummary, RunMetrics, SessionSnapshot,
    UsageTotals,
};
use crate::types::Message;

const UNKNOWN: &str = "unknown";

/// Session metadata from the init message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub model: String,
    pub cwd: String,
    pub permission_mode: String,
}

impl SystemInfo {
    pub fn from_messages(messages: &[Message]) -> Self {
        let init = first_init(messages);
        let known = |value: Option<&String>| value.filter(|v| !v.is_empty()).cloned();
        Self {
            model: known(init.and_then(|s| s.model.as_ref()))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            cwd: known(init.and_then(|s| s.cwd.as_ref())).unwrap_or_default(),
            permission_mode: known(init.and_then(|s| s.permission_mode.as_ref()))
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub session_id: String,
    pub success: bool,
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub metrics: RunMetrics,
    pub usage: UsageTotals,
    pub model_usage: BTreeMap<String, ModelUsageSummary>,
    pub conversation: ConversationStats,
    pub system: SystemInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_denials: Option<Vec<DeniedTool>>,
}

impl SummaryOutput {
    pub fn from_messages(messages: &[Message]) -> Self {
        let snapshot = SessionSnapshot::from_messages(messages);
        Self {
            session_id: snapshot.session_id,
            success: snapshot.success,
            result: snapshot.result,
            error_type: snapshot.error_type,
            metrics: snapshot.metrics,
            usage: snapshot.usage.totals,
            model_usage: snapshot.usage.per_model,
            conversation: ConversationStats::from_messages(messages),
            system: SystemInfo::from_messages(messages),
            permission_denials: snapshot.permission_denials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_info_reads_init_only() {
        let messages = vec![
            Message::from_value(json!({
                "type": "system", "subtype": "status", "model": "ignored"
            }))
            .unwrap(),
            Message::from_value(json!({
                "type": "system", "subtype": "init", "model": "opus",
                "cwd": "/repo", "permissionMode": "plan"
            }))
            .unwrap(),
        ];
        assert_eq!(
            SystemInfo::from_messages(&messages),
            SystemInfo {
                model: "opus".into(),
                cwd: "/repo".into(),
                permission_mode: "plan".into(),
            }
        );
    }

    #[test]
    fn counts_include_synthetic_users() {
        let messages = vec![
            Message::user("hi"),
            Message::synthetic_user(vec![]),
            Message::assistant(vec![]),
        ];
        let summary = SummaryOutput::from_messages(&messages);
        assert_eq!(summary.conversation.user_messages, 2);
        assert_eq!(summary.conversation.assistant_messages, 1);
    }
}
