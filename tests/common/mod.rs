//! Shared test helpers: message fixtures, a scripted runtime, a recording logger.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use sessionfold::collector::{CompletionReport, SessionLogger};
use sessionfold::error::{Result, SessionError};
use sessionfold::runtime::{AgentRuntime, MessageStream};
use sessionfold::session::SessionRequest;
use sessionfold::types::{ContentBlock, Message};

pub fn message(value: Value) -> Message {
    Message::from_value(value).unwrap()
}

pub fn init(model: &str) -> Message {
    message(json!({
        "type": "system",
        "subtype": "init",
        "session_id": "sess-init",
        "model": model,
        "permissionMode": "bypassPermissions",
        "cwd": "/work",
        "tools": ["Bash", "Read"],
        "mcp_servers": [{"name": "docs", "status": "connected"}]
    }))
}

pub fn user(text: &str) -> Message {
    Message::user(text)
}

pub fn assistant_text(text: &str) -> Message {
    Message::assistant(vec![ContentBlock::text(text)])
}

pub fn tool_use(id: &str, name: &str, input: Value) -> ContentBlock {
    ContentBlock::tool_use(id, name, input)
}

pub fn stream_event() -> Message {
    message(json!({
        "type": "stream_event",
        "event": {"type": "content_block_delta", "delta": {"text": "par"}}
    }))
}

pub fn result_success(text: &str, num_turns: u32) -> Message {
    message(json!({
        "type": "result",
        "subtype": "success",
        "session_id": "sess-result",
        "result": text,
        "num_turns": num_turns,
        "duration_ms": 1200,
        "duration_api_ms": 900,
        "total_cost_usd": 0.0125,
        "usage": {
            "input_tokens": 120,
            "output_tokens": 45,
            "cache_read_input_tokens": 10,
            "cache_creation_input_tokens": 5
        },
        "modelUsage": {
            "claude-sonnet": {
                "inputTokens": 120,
                "outputTokens": 45,
                "cacheReadInputTokens": 10,
                "cacheCreationInputTokens": 5,
                "webSearchRequests": 1,
                "costUSD": 0.0125,
                "contextWindow": 200000
            }
        },
        "permission_denials": []
    }))
}

pub fn result_error(subtype: &str) -> Message {
    message(json!({"type": "result", "subtype": subtype, "num_turns": 3}))
}

/// Scenario A buffer.
pub fn scenario_a() -> Vec<Message> {
    vec![
        init("sonnet"),
        user("fix bug"),
        Message::assistant(vec![
            ContentBlock::text("done"),
            tool_use("toolu_1", "Bash", json!({"command": "cargo test"})),
        ]),
        result_success("Fixed.", 1),
    ]
}

/// One scripted step of a runtime's output.
#[derive(Debug, Clone)]
pub enum Step {
    Emit(Message),
    Fail(String),
    Sleep(Duration),
    /// Never yields again.
    Hang,
    /// Fire the request's cancellation handle, as a runtime reacting to an abort would.
    CancelRequest,
}

/// Runtime that plays back a fixed script for every query.
#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    steps: Vec<Step>,
    queries: AtomicUsize,
}

impl ScriptedRuntime {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn emitting(messages: Vec<Message>) -> Self {
        Self::new(messages.into_iter().map(Step::Emit).collect())
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn query(&self, request: &SessionRequest) -> Result<MessageStream> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let steps = self.steps.clone();
        let cancellation = request.cancellation.clone();
        let stream = async_stream::stream! {
            for step in steps {
                match step {
                    Step::Emit(message) => {
                        yield Ok(message);
                    }
                    Step::Fail(reason) => {
                        yield Err(SessionError::stream(reason));
                        break;
                    }
                    Step::Sleep(duration) => tokio::time::sleep(duration).await,
                    Step::Hang => futures::future::pending::<()>().await,
                    Step::CancelRequest => {
                        if let Some(handle) = &cancellation {
                            handle.cancel();
                        }
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}

/// Logger that records event names.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionLogger for RecordingLogger {
    fn session_started(&self, _run_id: Uuid, request: &SessionRequest, item_index: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("start {} {} #{item_index}", request.mode, request.options.model));
    }

    fn message_received(&self, message: &Message) {
        self.events.lock().unwrap().push(format!("message {}", message.kind()));
    }

    fn session_completed(&self, report: &CompletionReport) {
        self.events.lock().unwrap().push(format!(
            "complete {} success={} cancelled={}",
            report.message_count, report.success, report.cancelled
        ));
    }
}
