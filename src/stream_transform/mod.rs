//! Transformations over agent message streams.

use std::sync::Arc;

use futures::StreamExt;

use crate::runtime::MessageStream;
use crate::types::Message;

/// Trait for transforming a message stream.
pub trait StreamTransform: Send + Sync {
    fn transform(&self, stream: MessageStream) -> MessageStream;
}

/// Keep only messages matching a predicate. Errors pass through and end the stream.
#[derive(Clone)]
pub struct FilterTransform {
    predicate: Arc<dyn Fn(&Message) -> bool + Send + Sync>,
}

impl FilterTransform {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Drop incremental `stream_event` messages.
    pub fn without_stream_events() -> Self {
        Self::new(|message| !message.is_stream_event())
    }
}

impl std::fmt::Debug for FilterTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterTransform").finish_non_exhaustive()
    }
}

impl StreamTransform for FilterTransform {
    fn transform(&self, stream: MessageStream) -> MessageStream {
        let predicate = self.predicate.clone();
        let transformed = async_stream::stream! {
            let mut inner = stream;
            while let Some(item) = inner.next().await {
                match item {
                    Ok(message) => {
                        if (predicate)(&message) {
                            yield Ok(message);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };
        Box::pin(transformed)
    }
}
