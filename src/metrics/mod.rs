//! Terminal snapshot and usage rollup extracted from a collected buffer.
//!
//! Everything here is derived from the first `result` message and the first
//! `system/init` message. Missing data never fails: numbers default to zero,
//! the session id to `"unknown"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ContentBlock, Message, ModelUsage, ResultMessage, SystemMessage, TokenUsage};

/// Session id reported when neither the result nor the init message has one.
pub const UNKNOWN_SESSION: &str = "unknown";

/// First terminal `result` message in the buffer.
pub fn first_result(messages: &[Message]) -> Option<&ResultMessage> {
    messages.iter().find_map(Message::as_result)
}

/// First `system/init` message in the buffer.
pub fn first_init(messages: &[Message]) -> Option<&SystemMessage> {
    messages.iter().find_map(Message::as_init)
}

/// Session id: result first, then init, then `"unknown"`.
pub fn session_id(messages: &[Message]) -> String {
    let non_empty = |id: &&str| !id.is_empty();
    first_result(messages)
        .and_then(|r| r.session_id.as_deref())
        .filter(non_empty)
        .or_else(|| {
            first_init(messages)
                .and_then(|s| s.session_id.as_deref())
                .filter(non_empty)
        })
        .unwrap_or(UNKNOWN_SESSION)
        .to_string()
}

/// Distinct tool names across every assistant message, in first-appearance order.
pub fn tools_used(messages: &[Message]) -> Vec<String> {
    let mut tools: Vec<String> = Vec::new();
    for assistant in messages.iter().filter_map(Message::as_assistant) {
        for block in assistant.content() {
            if let ContentBlock::ToolUse { name, .. } = block {
                if !tools.iter().any(|t| t == name) {
                    tools.push(name.clone());
                }
            }
        }
    }
    tools
}

/// Timing and cost of a session, zeroed when unreported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub turns: u32,
    pub duration_ms: u64,
    pub duration_api_ms: u64,
    pub cost_usd: f64,
}

impl RunMetrics {
    pub fn from_result(result: Option<&ResultMessage>) -> Self {
        let Some(result) = result else {
            return Self::default();
        };
        Self {
            turns: result.num_turns.unwrap_or_default(),
            duration_ms: result.duration_ms.unwrap_or_default(),
            duration_api_ms: result.duration_api_ms.unwrap_or_default(),
            cost_usd: result.total_cost_usd.unwrap_or_default(),
        }
    }
}

/// Session-wide token counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
}

impl From<&TokenUsage> for UsageTotals {
    fn from(usage: &TokenUsage) -> Self {
        Self {
            input_tokens: usage.input_tokens.unwrap_or_default(),
            output_tokens: usage.output_tokens.unwrap_or_default(),
            cache_read_tokens: usage.cache_read_input_tokens.unwrap_or_default(),
            cache_creation_tokens: usage.cache_creation_input_tokens.unwrap_or_default(),
        }
    }
}

/// Token and cost figures for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsageSummary {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cost_usd: f64,
    pub web_search_requests: u64,
}

impl ModelUsageSummary {
    /// Accumulate another entry into this one.
    pub fn merge(&mut self, other: &ModelUsageSummary) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.cache_creation_tokens += other.cache_creation_tokens;
        self.cost_usd += other.cost_usd;
        self.web_search_requests += other.web_search_requests;
    }
}

impl From<&ModelUsage> for ModelUsageSummary {
    fn from(usage: &ModelUsage) -> Self {
        Self {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cache_read_tokens: usage.cache_read_input_tokens,
            cache_creation_tokens: usage.cache_creation_input_tokens,
            cost_usd: usage.cost_usd,
            web_search_requests: usage.web_search_requests,
        }
    }
}

/// Per-model usage plus session totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRollup {
    pub totals: UsageTotals,
    pub per_model: BTreeMap<String, ModelUsageSummary>,
    pub total_cost_usd: f64,
}

impl UsageRollup {
    pub fn from_result(result: Option<&ResultMessage>) -> Self {
        let Some(result) = result else {
            return Self::default();
        };
        Self {
            totals: result.usage.as_ref().map(UsageTotals::from).unwrap_or_default(),
            per_model: result
                .model_usage
                .iter()
                .flatten()
                .map(|(model, usage)| (model.clone(), ModelUsageSummary::from(usage)))
                .collect(),
            total_cost_usd: result.total_cost_usd.unwrap_or_default(),
        }
    }

    /// All per-model entries folded into one.
    pub fn model_sum(&self) -> ModelUsageSummary {
        self.per_model
            .values()
            .fold(ModelUsageSummary::default(), |mut sum, usage| {
                sum.merge(usage);
                sum
            })
    }
}

/// A tool invocation the runtime refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeniedTool {
    pub tool_name: String,
    pub tool_use_id: String,
}

/// Everything the summary and full projections report about how a run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub success: bool,
    /// Result text; `None` unless the run succeeded.
    pub result: Option<String>,
    /// Result subtype, present only when a result arrived and was not a success.
    pub error_type: Option<String>,
    pub metrics: RunMetrics,
    pub usage: UsageRollup,
    /// `None` when the runtime reported no denials.
    pub permission_denials: Option<Vec<DeniedTool>>,
}

impl SessionSnapshot {
    pub fn from_messages(messages: &[Message]) -> Self {
        let result = first_result(messages);
        let success = result.is_some_and(|r| r.subtype.is_success());
        let permission_denials = result
            .and_then(|r| r.permission_denials.as_ref())
            .filter(|denials| !denials.is_empty())
            .map(|denials| {
                denials
                    .iter()
                    .map(|d| DeniedTool {
                        tool_name: d.tool_name.clone(),
                        tool_use_id: d.tool_use_id.clone(),
                    })
                    .collect()
            });

        Self {
            session_id: session_id(messages),
            success,
            result: result.filter(|_| success).and_then(|r| r.result.clone()),
            error_type: result
                .filter(|_| !success)
                .map(|r| r.subtype.as_str().to_string()),
            metrics: RunMetrics::from_result(result),
            usage: UsageRollup::from_result(result),
            permission_denials,
        }
    }
}

/// Message counts for the summary projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStats {
    /// Every `user` message, synthetic or not.
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub tools_used: Vec<String>,
}

impl ConversationStats {
    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            user_messages: messages.iter().filter(|m| m.as_user().is_some()).count(),
            assistant_messages: messages.iter().filter(|m| m.as_assistant().is_some()).count(),
            tools_used: tools_used(messages),
        }
    }
}
