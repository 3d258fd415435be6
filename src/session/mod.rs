//! Session request building: options, validation, cancellation.

pub mod cancel;
pub mod mode;
pub mod options;
pub mod request;

pub use cancel::{CancelReason, CancellationHandle};
pub use mode::{PermissionMode, SessionMode, SystemPromptMode};
pub use options::{SessionOptions, DEFAULT_MODEL};
pub use request::{RequestOptions, SessionRequest, SystemPrompt};
