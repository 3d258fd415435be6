//! Runtime that replays a recorded message stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use async_trait::async_trait;

use super::{AgentRuntime, MessageStream};
use crate::error::{Result, SessionError};
use crate::session::SessionRequest;
use crate::types::Message;

/// Replays a fixed message list for every request.
///
/// Useful for digesting transcripts captured with `--output-format stream-json`
/// and for tests.
#[derive(Debug, Clone, Default)]
pub struct ReplayRuntime {
    messages: Vec<Message>,
}

impl ReplayRuntime {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Decode newline-delimited JSON. Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut messages = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let message = Message::from_json_line(&line).map_err(|source| SessionError::Decode {
                line: index + 1,
                source,
            })?;
            messages.push(message);
        }
        Ok(Self { messages })
    }

    pub fn from_jsonl_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[async_trait]
impl AgentRuntime for ReplayRuntime {
    fn name(&self) -> &str {
        "replay"
    }

    async fn query(&self, request: &SessionRequest) -> Result<MessageStream> {
        let messages = self.messages.clone();
        let cancellation = request.cancellation.clone();
        let stream = async_stream::stream! {
            for message in messages {
                if cancellation.as_ref().is_some_and(|c| c.is_cancelled()) {
                    break;
                }
                yield Ok::<_, SessionError>(message);
            }
        };
        Ok(Box::pin(stream))
    }
}
