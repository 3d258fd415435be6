//! The seam to the external agent runtime.

#[cfg(feature = "process")]
pub mod process;
pub mod replay;

#[cfg(feature = "process")]
pub use process::ProcessRuntime;
pub use replay::ReplayRuntime;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::SessionError;
use crate::session::SessionRequest;
use crate::types::Message;

/// Ordered, single-pass message sequence produced for one request.
pub type MessageStream = BoxStream<'static, Result<Message, SessionError>>;

/// Anything that accepts a session request and emits its message stream.
///
/// Implementations are expected to stop emitting once the request's
/// cancellation handle fires.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Runtime name used in log lines.
    fn name(&self) -> &str;

    /// Submit the request and return its message stream.
    async fn query(&self, request: &SessionRequest) -> Result<MessageStream, SessionError>;
}
