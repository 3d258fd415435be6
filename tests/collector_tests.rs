//! Tests for stream collection, filtering, and cancellation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use common::*;
use sessionfold::collector::{CollectOptions, StreamCollector};
use sessionfold::error::SessionError;
use sessionfold::runtime::AgentRuntime;
use sessionfold::session::{CancelReason, SessionOptions, SessionRequest};
use sessionfold::types::Message;

fn request(timeout_secs: f64) -> SessionRequest {
    SessionRequest::build(
        &SessionOptions::builder()
            .prompt("collect")
            .timeout_secs(timeout_secs)
            .build(),
    )
    .unwrap()
}

async fn collect(
    runtime: &ScriptedRuntime,
    request: &SessionRequest,
    options: CollectOptions,
) -> Result<sessionfold::collector::CollectedBuffer, SessionError> {
    let stream = runtime.query(request).await?;
    StreamCollector::silent().collect(request, stream, options).await
}

fn kinds(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.kind().to_string()).collect()
}

#[tokio::test]
async fn stream_events_are_dropped_by_default() {
    let runtime = ScriptedRuntime::emitting(vec![
        user("hi"),
        stream_event(),
        assistant_text("hello"),
        stream_event(),
        result_success("hello", 1),
    ]);
    let buffer = collect(&runtime, &request(0.0), CollectOptions::default())
        .await
        .unwrap();
    assert_eq!(kinds(&buffer.messages), vec!["user", "assistant", "result"]);
}

#[tokio::test]
async fn stream_events_are_kept_in_order_when_requested() {
    let runtime = ScriptedRuntime::emitting(vec![
        user("hi"),
        stream_event(),
        assistant_text("hello"),
    ]);
    let options = CollectOptions {
        include_stream_events: true,
        ..CollectOptions::default()
    };
    let buffer = collect(&runtime, &request(0.0), options).await.unwrap();
    assert_eq!(kinds(&buffer.messages), vec!["user", "stream_event", "assistant"]);
}

#[tokio::test]
async fn unknown_message_types_are_buffered() {
    let runtime = ScriptedRuntime::emitting(vec![
        message(serde_json::json!({"type": "telemetry", "n": 1})),
        user("hi"),
    ]);
    let buffer = collect(&runtime, &request(0.0), CollectOptions::default())
        .await
        .unwrap();
    assert_eq!(kinds(&buffer.messages), vec!["telemetry", "user"]);
}

#[tokio::test(start_paused = true)]
async fn timeout_returns_partial_buffer() {
    let runtime = ScriptedRuntime::new(vec![
        Step::Emit(init("sonnet")),
        Step::Emit(user("slow task")),
        Step::Sleep(Duration::from_secs(1)),
        Step::Emit(assistant_text("working")),
        Step::Hang,
        Step::Emit(result_success("never", 1)),
    ]);
    let request = request(5.0);
    let buffer = collect(&runtime, &request, CollectOptions::default())
        .await
        .unwrap();

    assert!(buffer.cancelled);
    assert!(!buffer.has_result());
    assert_eq!(kinds(&buffer.messages), vec!["system", "user", "assistant"]);
    assert_eq!(
        request.cancellation.as_ref().and_then(|c| c.reason()),
        Some(CancelReason::Timeout)
    );
}

#[tokio::test(start_paused = true)]
async fn run_finishing_before_deadline_is_not_cancelled() {
    let runtime = ScriptedRuntime::new(vec![
        Step::Emit(user("quick")),
        Step::Sleep(Duration::from_millis(100)),
        Step::Emit(result_success("ok", 1)),
    ]);
    let request = request(10.0);
    let buffer = collect(&runtime, &request, CollectOptions::default())
        .await
        .unwrap();
    assert!(!buffer.cancelled);
    assert!(buffer.has_result());
    assert_eq!(request.cancellation.as_ref().and_then(|c| c.reason()), None);
}

#[tokio::test]
async fn explicit_cancel_stops_collection() {
    let runtime = ScriptedRuntime::new(vec![Step::Emit(user("hi")), Step::Hang]);
    let request = SessionRequest {
        cancellation: Some(sessionfold::session::CancellationHandle::new()),
        ..request(0.0)
    };
    let handle = request.cancellation.clone().unwrap();
    let stream = runtime.query(&request).await.unwrap();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
    });
    let buffer = StreamCollector::silent()
        .collect(&request, stream, CollectOptions::default())
        .await
        .unwrap();
    canceller.await.unwrap();

    assert!(buffer.cancelled);
    assert_eq!(kinds(&buffer.messages), vec!["user"]);
}

#[tokio::test(start_paused = true)]
async fn error_after_cancellation_keeps_partial_buffer() {
    let runtime = ScriptedRuntime::new(vec![
        Step::Emit(init("sonnet")),
        Step::Emit(user("long job")),
        Step::Sleep(Duration::from_secs(1)),
        Step::Emit(assistant_text("halfway")),
        Step::CancelRequest,
        Step::Fail("aborted by user".to_string()),
        Step::Emit(result_success("never", 1)),
    ]);
    let request = request(30.0);
    let buffer = collect(&runtime, &request, CollectOptions::default())
        .await
        .unwrap();

    assert!(buffer.cancelled);
    assert!(!buffer.has_result());
    assert_eq!(kinds(&buffer.messages), vec!["system", "user", "assistant"]);
    assert_eq!(
        request.cancellation.as_ref().and_then(|c| c.reason()),
        Some(CancelReason::Requested)
    );
}

#[tokio::test]
async fn stream_error_propagates_without_retry() {
    let runtime = ScriptedRuntime::new(vec![
        Step::Emit(user("hi")),
        Step::Fail("connection reset".to_string()),
        Step::Emit(result_success("unreachable", 1)),
    ]);
    let err = collect(&runtime, &request(0.0), CollectOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Stream(ref m) if m == "connection reset"));
    assert_eq!(runtime.queries(), 1);
}

#[tokio::test]
async fn logging_does_not_change_the_buffer() {
    let script = vec![
        init("sonnet"),
        user("hi"),
        stream_event(),
        assistant_text("hello"),
        result_success("hello", 1),
    ];
    let request = request(0.0);

    let quiet = collect(
        &ScriptedRuntime::emitting(script.clone()),
        &request,
        CollectOptions::default(),
    )
    .await
    .unwrap();

    let logger = Arc::new(RecordingLogger::default());
    let runtime = ScriptedRuntime::emitting(script);
    let stream = runtime.query(&request).await.unwrap();
    let logged = StreamCollector::new(logger.clone())
        .collect(
            &request,
            stream,
            CollectOptions {
                debug: true,
                item_index: 7,
                ..CollectOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(logged.messages, quiet.messages);
    assert_eq!(
        logger.events(),
        vec![
            "start new sonnet #7",
            "message system",
            "message user",
            "message assistant",
            "message result",
            "complete 4 success=true cancelled=false",
        ]
    );
}

#[tokio::test]
async fn logger_is_silent_without_debug() {
    let logger = Arc::new(RecordingLogger::default());
    let runtime = ScriptedRuntime::emitting(vec![user("hi")]);
    let request = request(0.0);
    let stream = runtime.query(&request).await.unwrap();
    StreamCollector::new(logger.clone())
        .collect(&request, stream, CollectOptions::default())
        .await
        .unwrap();
    assert!(logger.events().is_empty());
}
