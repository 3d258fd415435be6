//! Tests for the text, summary, and full projections.

mod common;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::*;
use sessionfold::projection::{
    OutputFormat, Projection, SummaryOutput, TextOutput, EXECUTION_FAILED_ADVICE,
    MAX_TURNS_ADVICE, NO_RESPONSE,
};
use sessionfold::types::Message;

fn render(format: OutputFormat, messages: &[Message]) -> Value {
    Projection::render(format, messages).to_value().unwrap()
}

#[test]
fn scenario_a_summary() {
    assert_eq!(
        render(OutputFormat::Summary, &scenario_a()),
        json!({
            "session_id": "sess-result",
            "success": true,
            "result": "Fixed.",
            "metrics": {
                "turns": 1,
                "duration_ms": 1200,
                "duration_api_ms": 900,
                "cost_usd": 0.0125
            },
            "usage": {
                "input_tokens": 120,
                "output_tokens": 45,
                "cache_read_tokens": 10,
                "cache_creation_tokens": 5
            },
            "model_usage": {
                "claude-sonnet": {
                    "input_tokens": 120,
                    "output_tokens": 45,
                    "cache_read_tokens": 10,
                    "cache_creation_tokens": 5,
                    "cost_usd": 0.0125,
                    "web_search_requests": 1
                }
            },
            "conversation": {
                "user_messages": 1,
                "assistant_messages": 1,
                "tools_used": ["Bash"]
            },
            "system": {
                "model": "sonnet",
                "cwd": "/work",
                "permission_mode": "bypassPermissions"
            }
        })
    );
}

#[test]
fn scenario_a_full_timeline_and_init() {
    let full = render(OutputFormat::Full, &scenario_a());
    assert_eq!(full["messages"].as_array().unwrap().len(), 4);
    assert_eq!(full["parsed"]["session_id"], "sess-result");
    assert_eq!(
        full["parsed"]["timeline"],
        json!([{
            "turn": 1,
            "user": "fix bug",
            "assistant": "done",
            "tools": [{"name": "Bash", "input": {"command": "cargo test"}, "success": true}]
        }])
    );
    assert_eq!(
        full["parsed"]["init"],
        json!({
            "model": "sonnet",
            "permission_mode": "bypassPermissions",
            "cwd": "/work",
            "tools": ["Bash", "Read"],
            "mcp_servers": [{"name": "docs", "status": "connected"}]
        })
    );
    let result = &full["parsed"]["result"];
    assert_eq!(result["success"], true);
    assert_eq!(result["text"], "Fixed.");
    assert!(result.get("error_type").is_none());
    assert!(result.get("conversation").is_none());
    assert_eq!(result["metrics"]["turns"], 1);
    assert_eq!(result["usage"]["input_tokens"], 120);
}

#[test]
fn full_messages_round_trip_verbatim() {
    let messages = scenario_a();
    let full = render(OutputFormat::Full, &messages);
    let original: Vec<Value> = messages
        .iter()
        .map(|m| serde_json::to_value(m).unwrap())
        .collect();
    assert_eq!(full["messages"], Value::Array(original));
    assert_eq!(full["messages"][0]["permissionMode"], "bypassPermissions");
    assert_eq!(full["messages"][3]["modelUsage"]["claude-sonnet"]["contextWindow"], 200000);
}

#[test]
fn scenario_b_max_turns() {
    let messages = vec![user("x"), result_error("error_max_turns")];
    assert_eq!(TextOutput::from_messages(&messages).result, MAX_TURNS_ADVICE);

    let summary = SummaryOutput::from_messages(&messages);
    assert!(!summary.success);
    assert_eq!(summary.error_type.as_deref(), Some("error_max_turns"));
    assert_eq!(summary.result, None);
    assert_eq!(summary.metrics.turns, 3);
}

#[test]
fn scenario_c_empty_buffer() {
    assert_eq!(render(OutputFormat::Text, &[]), json!({"result": NO_RESPONSE}));

    let summary = render(OutputFormat::Summary, &[]);
    assert_eq!(summary["session_id"], "unknown");
    assert_eq!(summary["system"]["model"], "unknown");
    assert_eq!(summary["system"]["permission_mode"], "unknown");
    assert_eq!(summary["system"]["cwd"], "");
    assert_eq!(summary["model_usage"], json!({}));

    let full = render(OutputFormat::Full, &[]);
    assert_eq!(
        full,
        json!({"messages": [], "parsed": {"session_id": "unknown", "timeline": []}})
    );
}

#[test]
fn success_text_wins_over_assistant_text() {
    let messages = vec![
        user("q"),
        assistant_text("assistant said this"),
        result_success("final answer", 1),
    ];
    assert_eq!(TextOutput::from_messages(&messages).result, "final answer");
}

#[test]
fn execution_error_advice() {
    let messages = vec![user("q"), assistant_text("partial"), result_error("error_during_execution")];
    assert_eq!(TextOutput::from_messages(&messages).result, EXECUTION_FAILED_ADVICE);
}

#[test]
fn missing_result_falls_back_to_last_assistant() {
    let messages = vec![user("q"), assistant_text("first"), assistant_text("second")];
    assert_eq!(TextOutput::from_messages(&messages).result, "second");
}

#[test]
fn summary_without_result_has_null_result_and_zero_numbers() {
    let summary = render(OutputFormat::Summary, &[user("q"), assistant_text("a")]);
    assert_eq!(summary["result"], Value::Null);
    assert_eq!(summary["success"], false);
    assert!(summary.get("error_type").is_none());
    assert!(summary.get("permission_denials").is_none());
    for key in ["turns", "duration_ms", "duration_api_ms", "cost_usd"] {
        assert!(summary["metrics"][key].is_number(), "metrics.{key}");
    }
    for key in ["input_tokens", "output_tokens", "cache_read_tokens", "cache_creation_tokens"] {
        assert_eq!(summary["usage"][key], 0, "usage.{key}");
    }
}

#[test]
fn permission_denials_listed_when_present() {
    let denied = message(json!({
        "type": "result",
        "subtype": "success",
        "result": "partly done",
        "permission_denials": [
            {"tool_name": "Write", "tool_use_id": "toolu_9", "tool_input": {"file_path": "/etc/hosts"}}
        ]
    }));
    let summary = render(OutputFormat::Summary, &[denied]);
    assert_eq!(
        summary["permission_denials"],
        json!([{"tool_name": "Write", "tool_use_id": "toolu_9"}])
    );
}

#[test]
fn projections_are_idempotent() {
    let messages = scenario_a();
    for format in [OutputFormat::Text, OutputFormat::Summary, OutputFormat::Full] {
        assert_eq!(render(format, &messages), render(format, &messages));
    }
}
