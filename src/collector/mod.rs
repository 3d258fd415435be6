//! Single-pass stream collection under a cancellation policy.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::metrics::{first_result, ModelUsageSummary, UsageRollup};
use crate::runtime::MessageStream;
use crate::session::SessionRequest;
use crate::stream_transform::{FilterTransform, StreamTransform};
use crate::types::Message;

/// Observer for a collection run. Never sees or alters the buffer itself.
pub trait SessionLogger: Send + Sync {
    fn session_started(&self, run_id: Uuid, request: &SessionRequest, item_index: usize);
    fn message_received(&self, message: &Message);
    fn session_completed(&self, report: &CompletionReport);
    fn session_failed(&self, _error: &SessionError) {}
}

/// Forwards collection events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl SessionLogger for TracingLogger {
    fn session_started(&self, run_id: Uuid, request: &SessionRequest, item_index: usize) {
        tracing::info!(
            %run_id,
            item_index,
            mode = %request.mode,
            model = %request.options.model,
            permission_mode = %request.options.permission_mode,
            timeout_ms = request.options.timeout_ms,
            "session started"
        );
    }

    fn message_received(&self, message: &Message) {
        tracing::debug!(
            kind = message.kind(),
            subtype = message.subtype().unwrap_or_default(),
            "message received"
        );
    }

    fn session_completed(&self, report: &CompletionReport) {
        tracing::info!(
            run_id = %report.run_id,
            duration_ms = report.elapsed.as_millis() as u64,
            message_count = report.message_count,
            success = report.success,
            cancelled = report.cancelled,
            total_cost_usd = report.total_cost_usd,
            model_input_tokens = report.models.input_tokens,
            model_output_tokens = report.models.output_tokens,
            "session completed"
        );
    }

    fn session_failed(&self, error: &SessionError) {
        tracing::warn!(error = %error, category = ?error.category(), "session failed");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl SessionLogger for NoopLogger {
    fn session_started(&self, _run_id: Uuid, _request: &SessionRequest, _item_index: usize) {}
    fn message_received(&self, _message: &Message) {}
    fn session_completed(&self, _report: &CompletionReport) {}
}

/// Summary handed to [`SessionLogger::session_completed`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionReport {
    pub run_id: Uuid,
    pub elapsed: Duration,
    pub message_count: usize,
    pub success: bool,
    pub cancelled: bool,
    pub total_cost_usd: f64,
    pub models: ModelUsageSummary,
}

/// Per-run collection switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    /// Keep `stream_event` messages instead of dropping them.
    pub include_stream_events: bool,
    /// Emit diagnostic log events.
    pub debug: bool,
    pub item_index: usize,
}

/// The ordered messages of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedBuffer {
    /// Identifies this run in log events.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    /// The cancellation handle fired before the stream was exhausted.
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl CollectedBuffer {
    pub fn has_result(&self) -> bool {
        first_result(&self.messages).is_some()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Consumes a message stream exactly once.
#[derive(Clone)]
pub struct StreamCollector {
    logger: Arc<dyn SessionLogger>,
}

impl std::fmt::Debug for StreamCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCollector").finish_non_exhaustive()
    }
}

impl Default for StreamCollector {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl StreamCollector {
    pub fn new(logger: Arc<dyn SessionLogger>) -> Self {
        Self { logger }
    }

    /// A collector that logs nothing.
    pub fn silent() -> Self {
        Self::new(Arc::new(NoopLogger))
    }

    /// Drain `stream` into a buffer.
    ///
    /// Cancellation ends collection early and returns what was buffered so
    /// far with `cancelled` set. A stream error before cancellation is
    /// returned as-is; an error after cancellation counts as the early end.
    pub async fn collect(
        &self,
        request: &SessionRequest,
        stream: MessageStream,
        options: CollectOptions,
    ) -> Result<CollectedBuffer> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();
        if options.debug {
            self.logger.session_started(run_id, request, options.item_index);
        }

        let mut stream = if options.include_stream_events {
            stream
        } else {
            FilterTransform::without_stream_events().transform(stream)
        };

        let mut messages = Vec::new();
        let mut cancelled = false;
        loop {
            let next = match &request.cancellation {
                Some(handle) => tokio::select! {
                    biased;
                    _ = handle.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    next = stream.next() => next,
                },
                None => stream.next().await,
            };
            match next {
                Some(Ok(message)) => {
                    if options.debug {
                        self.logger.message_received(&message);
                    }
                    messages.push(message);
                }
                Some(Err(err)) if request.is_cancelled() => {
                    tracing::debug!(error = %err, "stream ended with error after cancellation");
                    cancelled = true;
                    break;
                }
                Some(Err(err)) => {
                    self.logger.session_failed(&err);
                    return Err(err);
                }
                None => break,
            }
        }
        cancelled |= request.is_cancelled() && first_result(&messages).is_none();

        let buffer = CollectedBuffer {
            run_id,
            started_at,
            messages,
            cancelled,
            elapsed: started.elapsed(),
        };
        if options.debug {
            let result = first_result(&buffer.messages);
            let usage = UsageRollup::from_result(result);
            self.logger.session_completed(&CompletionReport {
                run_id,
                elapsed: buffer.elapsed,
                message_count: buffer.messages.len(),
                success: result.is_some_and(|r| r.subtype.is_success()),
                cancelled: buffer.cancelled,
                total_cost_usd: usage.total_cost_usd,
                models: usage.model_sum(),
            });
        }
        Ok(buffer)
    }
}
