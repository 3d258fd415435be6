//! Per-item session configuration supplied by the host.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::mode::{PermissionMode, SessionMode, SystemPromptMode};
use crate::projection::OutputFormat;

/// Model used when an item does not name one.
pub const DEFAULT_MODEL: &str = "sonnet";

/// Configuration for one session run.
///
/// Numeric limits use signed types: zero or negative means "no limit".
///
/// ```
/// use sessionfold::session::{SessionMode, SessionOptions};
///
/// let options = SessionOptions::builder()
///     .prompt("Summarize the README")
///     .mode(SessionMode::Resume)
///     .session_id("550e8400-e29b-41d4-a716-446655440000")
///     .max_turns(10)
///     .build();
/// assert_eq!(options.model, "sonnet");
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionOptions {
    #[builder(default)]
    #[serde(alias = "operation")]
    pub mode: SessionMode,
    #[builder(into)]
    pub session_id: Option<String>,
    #[builder(into)]
    pub prompt: String,
    #[builder(into)]
    pub cwd: Option<String>,
    #[builder(into, default = DEFAULT_MODEL.to_string())]
    pub model: String,
    #[builder(default)]
    pub permission_mode: PermissionMode,
    #[builder(default)]
    pub max_turns: i64,
    #[builder(default)]
    #[serde(alias = "timeout")]
    pub timeout_secs: f64,
    #[builder(default)]
    pub output_format: OutputFormat,
    #[builder(default)]
    pub system_prompt_mode: SystemPromptMode,
    #[builder(into)]
    pub append_system_prompt: Option<String>,
    #[builder(into)]
    pub custom_system_prompt: Option<String>,
    #[builder(into)]
    pub fallback_model: Option<String>,
    #[builder(default)]
    pub max_thinking_tokens: i64,
    #[builder(default)]
    pub allowed_tools: Vec<String>,
    #[builder(default)]
    pub disallowed_tools: Vec<String>,
    #[builder(default)]
    pub additional_directories: Vec<String>,
    #[builder(default)]
    pub debug: bool,
    #[builder(default)]
    pub include_partial_messages: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: SessionMode::default(),
            session_id: None,
            prompt: String::new(),
            cwd: None,
            model: DEFAULT_MODEL.to_string(),
            permission_mode: PermissionMode::default(),
            max_turns: 0,
            timeout_secs: 0.0,
            output_format: OutputFormat::default(),
            system_prompt_mode: SystemPromptMode::default(),
            append_system_prompt: None,
            custom_system_prompt: None,
            fallback_model: None,
            max_thinking_tokens: 0,
            allowed_tools: Vec::new(),
            disallowed_tools: Vec::new(),
            additional_directories: Vec::new(),
            debug: false,
            include_partial_messages: false,
        }
    }
}
