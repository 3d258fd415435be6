//! Convenience re-exports for common use.

pub use crate::batch::{BatchExecutor, OutputRecord, RunOutcome, SessionRunner};
pub use crate::collector::{
    CollectOptions, CollectedBuffer, NoopLogger, SessionLogger, StreamCollector, TracingLogger,
};
pub use crate::config::RelayConfig;
pub use crate::error::{BatchError, Result, SessionError};
pub use crate::metrics::{SessionSnapshot, UsageRollup};
pub use crate::projection::{OutputFormat, Projection};
pub use crate::runtime::{AgentRuntime, MessageStream, ReplayRuntime};
#[cfg(feature = "process")]
pub use crate::runtime::ProcessRuntime;
pub use crate::session::{
    CancellationHandle, PermissionMode, SessionMode, SessionOptions, SessionRequest,
    SystemPromptMode,
};
pub use crate::timeline::{reconstruct_turns, ToolInvocation, Turn};
pub use crate::types::{ContentBlock, Message, ResultMessage, ResultSubtype};
