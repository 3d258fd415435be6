//! Terminal `result` message.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::usage::{ModelUsage, TokenUsage};

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultSubtype {
    Success,
    ErrorMaxTurns,
    ErrorDuringExecution,
    /// Any subtype this crate does not distinguish.
    Other(String),
}

impl ResultSubtype {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::ErrorMaxTurns => "error_max_turns",
            Self::ErrorDuringExecution => "error_during_execution",
            Self::Other(other) => other,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<String> for ResultSubtype {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "error_max_turns" => Self::ErrorMaxTurns,
            "error_during_execution" => Self::ErrorDuringExecution,
            _ => Self::Other(value),
        }
    }
}

impl From<ResultSubtype> for String {
    fn from(value: ResultSubtype) -> Self {
        match value {
            ResultSubtype::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ResultSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single message marking session completion.
///
/// Every metric is optional on the wire; consumers default absent values to zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultMessage {
    pub subtype: ResultSubtype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_api_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(rename = "modelUsage", default, skip_serializing_if = "Option::is_none")]
    pub model_usage: Option<BTreeMap<String, ModelUsage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_denials: Option<Vec<PermissionDenial>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultMessage {
    /// A result with the given subtype and no metrics.
    pub fn new(subtype: ResultSubtype) -> Self {
        Self {
            subtype,
            session_id: None,
            result: None,
            num_turns: None,
            duration_ms: None,
            duration_api_ms: None,
            total_cost_usd: None,
            usage: None,
            model_usage: None,
            permission_denials: None,
            extra: Map::new(),
        }
    }

    /// A successful result carrying the final text.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            result: Some(text.into()),
            ..Self::new(ResultSubtype::Success)
        }
    }
}

/// A tool invocation the runtime refused under the active permission mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PermissionDenial {
    pub tool_name: String,
    pub tool_use_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subtype_round_trips_known_and_unknown_values() {
        let known: ResultSubtype = serde_json::from_value(json!("error_max_turns")).unwrap();
        assert_eq!(known, ResultSubtype::ErrorMaxTurns);

        let other: ResultSubtype = serde_json::from_value(json!("error_max_budget_usd")).unwrap();
        assert_eq!(other, ResultSubtype::Other("error_max_budget_usd".to_string()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("error_max_budget_usd"));
    }

    #[test]
    fn result_tolerates_missing_metrics() {
        let result: ResultMessage =
            serde_json::from_value(json!({"subtype": "error_during_execution"})).unwrap();
        assert_eq!(result.num_turns, None);
        assert_eq!(result.usage, None);
        assert!(!result.subtype.is_success());
    }
}
