//! Running items end-to-end: one session per item, items one after another.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::collector::{CollectOptions, StreamCollector};
use crate::error::{BatchError, Result};
use crate::projection::Projection;
use crate::runtime::AgentRuntime;
use crate::session::{SessionOptions, SessionRequest};

/// What one run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub projection: Projection,
    pub message_count: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Build, query, collect, project.
#[derive(Debug)]
pub struct SessionRunner<R> {
    runtime: R,
    collector: StreamCollector,
}

impl<R: AgentRuntime> SessionRunner<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            collector: StreamCollector::default(),
        }
    }

    pub fn with_collector(mut self, collector: StreamCollector) -> Self {
        self.collector = collector;
        self
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Run one item. Validation failures return before the runtime is touched.
    pub async fn run(&self, options: &SessionOptions, item_index: usize) -> Result<RunOutcome> {
        let request = SessionRequest::build(options)?;
        tracing::debug!(
            item_index,
            runtime = self.runtime.name(),
            mode = %request.mode,
            "submitting request"
        );
        let stream = self.runtime.query(&request).await?;
        let buffer = self
            .collector
            .collect(
                &request,
                stream,
                CollectOptions {
                    include_stream_events: options.include_partial_messages,
                    debug: options.debug,
                    item_index,
                },
            )
            .await?;

        Ok(RunOutcome {
            run_id: buffer.run_id,
            started_at: buffer.started_at,
            projection: Projection::render(options.output_format, &buffer.messages),
            message_count: buffer.messages.len(),
            cancelled: buffer.cancelled,
            elapsed: buffer.elapsed,
        })
    }
}

/// One output record, tagged with the item it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub json: Value,
    pub paired_item: usize,
}

impl OutputRecord {
    /// Error record standing in for a failed item's projection.
    pub fn failure(item_index: usize, error: &crate::error::SessionError) -> Self {
        Self {
            json: json!({ "error": error.to_string(), "itemIndex": item_index }),
            paired_item: item_index,
        }
    }

    pub fn is_error(&self) -> bool {
        self.json.get("error").is_some() && self.json.get("itemIndex").is_some()
    }
}

/// Runs items strictly sequentially.
#[derive(Debug)]
pub struct BatchExecutor<R> {
    runner: SessionRunner<R>,
    continue_on_failure: bool,
}

impl<R: AgentRuntime> BatchExecutor<R> {
    pub fn new(runner: SessionRunner<R>) -> Self {
        Self {
            runner,
            continue_on_failure: false,
        }
    }

    /// Turn item failures into error records instead of aborting.
    pub fn continue_on_failure(mut self, enabled: bool) -> Self {
        self.continue_on_failure = enabled;
        self
    }

    pub async fn execute(
        &self,
        items: &[SessionOptions],
    ) -> std::result::Result<Vec<OutputRecord>, BatchError> {
        let mut records = Vec::with_capacity(items.len());
        for (item_index, options) in items.iter().enumerate() {
            let outcome = self
                .runner
                .run(options, item_index)
                .await
                .and_then(|outcome| outcome.projection.to_value());
            match outcome {
                Ok(json) => records.push(OutputRecord {
                    json,
                    paired_item: item_index,
                }),
                Err(source) if self.continue_on_failure => {
                    tracing::warn!(item_index, error = %source, "item failed, continuing");
                    records.push(OutputRecord::failure(item_index, &source));
                }
                Err(source) => return Err(BatchError { item_index, source }),
            }
        }
        Ok(records)
    }
}
