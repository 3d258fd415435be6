//! Normalized outbound session request.

use std::time::Duration;

use serde::Serialize;

use super::cancel::CancellationHandle;
use super::mode::{PermissionMode, SessionMode, SystemPromptMode};
use super::options::SessionOptions;
use crate::error::{Result, SessionError};

/// Replacement or extension of the runtime's default system prompt.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "mode", content = "text", rename_all = "snake_case")]
pub enum SystemPrompt {
    Append(String),
    Custom(String),
}

/// Runtime options of a normalized request. Unset limits are absent, never zero.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestOptions {
    pub model: String,
    pub permission_mode: PermissionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(rename = "continue", skip_serializing_if = "is_false")]
    pub continue_recent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub fork_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_thinking_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<SystemPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disallowed_tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_directories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "is_false")]
    pub include_partial_messages: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One normalized request to the agent runtime.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub mode: SessionMode,
    pub prompt: String,
    pub options: RequestOptions,
    /// Present only when a positive timeout was configured.
    pub cancellation: Option<CancellationHandle>,
}

impl SessionRequest {
    /// Validate and normalize `options` into a request.
    ///
    /// Fails with [`SessionError::Validation`] on a blank prompt, on a blank
    /// session id for resume/fork, or on a timeout too large to schedule. The
    /// prompt check runs first.
    pub fn build(options: &SessionOptions) -> Result<Self> {
        if options.prompt.trim().is_empty() {
            return Err(SessionError::validation("Prompt is required"));
        }

        let mut resume = None;
        if options.mode.requires_session_id() {
            let session_id = non_blank(options.session_id.as_deref()).ok_or_else(|| {
                SessionError::validation(format!(
                    "Session ID is required for {} operation",
                    options.mode
                ))
            })?;
            resume = Some(session_id);
        }
        let continue_recent = options.mode == SessionMode::Continue;
        let fork_session = options.mode == SessionMode::Fork;

        let timeout = positive_timeout(options.timeout_secs)?;
        let cancellation = timeout
            .map(|t| {
                CancellationHandle::with_timeout(t).ok_or_else(|| {
                    SessionError::validation(format!(
                        "Timeout of {} seconds is too large",
                        options.timeout_secs
                    ))
                })
            })
            .transpose()?;
        let request_options = RequestOptions {
            model: options.model.clone(),
            permission_mode: options.permission_mode,
            cwd: non_blank(options.cwd.as_deref()),
            continue_recent,
            resume,
            fork_session,
            max_turns: positive_limit(options.max_turns),
            max_thinking_tokens: positive_limit(options.max_thinking_tokens),
            timeout_ms: timeout.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
            system_prompt: system_prompt(options),
            fallback_model: non_blank(options.fallback_model.as_deref()),
            allowed_tools: non_empty(&options.allowed_tools),
            disallowed_tools: non_empty(&options.disallowed_tools),
            additional_directories: directories(&options.additional_directories),
            include_partial_messages: options.include_partial_messages,
        };

        Ok(Self {
            mode: options.mode,
            prompt: options.prompt.clone(),
            options: request_options,
            cancellation,
        })
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationHandle::is_cancelled)
    }
}

impl TryFrom<&SessionOptions> for SessionRequest {
    type Error = SessionError;

    fn try_from(options: &SessionOptions) -> Result<Self> {
        Self::build(options)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

fn directories(paths: &[String]) -> Option<Vec<String>> {
    let dirs: Vec<String> = paths
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    (!dirs.is_empty()).then_some(dirs)
}

fn positive_limit(value: i64) -> Option<u32> {
    (value > 0).then(|| u32::try_from(value).unwrap_or(u32::MAX))
}

fn positive_timeout(seconds: f64) -> Result<Option<Duration>> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Ok(None);
    }
    Duration::try_from_secs_f64(seconds)
        .map(Some)
        .map_err(|_| SessionError::validation(format!("Timeout of {seconds} seconds is too large")))
}

fn system_prompt(options: &SessionOptions) -> Option<SystemPrompt> {
    match options.system_prompt_mode {
        SystemPromptMode::Default => None,
        SystemPromptMode::Append => {
            non_blank(options.append_system_prompt.as_deref()).map(SystemPrompt::Append)
        }
        SystemPromptMode::Custom => {
            non_blank(options.custom_system_prompt.as_deref()).map(SystemPrompt::Custom)
        }
    }
}
