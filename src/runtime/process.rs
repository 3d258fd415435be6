//! Runtime that drives the agent CLI as a child process.
//!
//! The CLI is run in print mode with `--output-format stream-json`, which
//! writes one protocol message per stdout line. The prompt goes in on stdin.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_stream::wrappers::LinesStream;

use super::{AgentRuntime, MessageStream};
use crate::config::RelayConfig;
use crate::error::{Result, SessionError};
use crate::session::{SessionRequest, SystemPrompt};
use crate::types::Message;

const STDERR_TAIL_BYTES: usize = 2_000;

/// Spawns one agent process per request.
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    binary: PathBuf,
    env: BTreeMap<String, String>,
}

impl ProcessRuntime {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            binary: config.agent_binary.clone(),
            env: config.env.clone(),
        }
    }

    /// Add an environment variable for every spawned process.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }
}

/// CLI arguments for a request, excluding the prompt.
pub fn command_args(request: &SessionRequest) -> Vec<String> {
    let options = &request.options;
    let mut args: Vec<String> = vec![
        "--print".into(),
        "--output-format".into(),
        "stream-json".into(),
        "--verbose".into(),
        "--model".into(),
        options.model.clone(),
        "--permission-mode".into(),
        options.permission_mode.to_string(),
    ];

    if options.continue_recent {
        args.push("--continue".into());
    }
    if let Some(session_id) = &options.resume {
        args.extend(["--resume".into(), session_id.clone()]);
    }
    if options.fork_session {
        args.push("--fork-session".into());
    }
    if let Some(max_turns) = options.max_turns {
        args.extend(["--max-turns".into(), max_turns.to_string()]);
    }
    match &options.system_prompt {
        Some(SystemPrompt::Append(text)) => {
            args.extend(["--append-system-prompt".into(), text.clone()]);
        }
        Some(SystemPrompt::Custom(text)) => {
            args.extend(["--system-prompt".into(), text.clone()]);
        }
        None => {}
    }
    if let Some(model) = &options.fallback_model {
        args.extend(["--fallback-model".into(), model.clone()]);
    }
    if let Some(tools) = &options.allowed_tools {
        args.extend(["--allowedTools".into(), tools.join(",")]);
    }
    if let Some(tools) = &options.disallowed_tools {
        args.extend(["--disallowedTools".into(), tools.join(",")]);
    }
    for dir in options.additional_directories.iter().flatten() {
        args.extend(["--add-dir".into(), dir.clone()]);
    }
    if options.include_partial_messages {
        args.push("--include-partial-messages".into());
    }
    args
}

enum Next {
    Line(Option<std::io::Result<String>>),
    Cancelled,
}

#[async_trait]
impl AgentRuntime for ProcessRuntime {
    fn name(&self) -> &str {
        "process"
    }

    async fn query(&self, request: &SessionRequest) -> Result<MessageStream> {
        let mut command = Command::new(&self.binary);
        command
            .args(command_args(request))
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &request.options.cwd {
            command.current_dir(cwd);
        }
        if let Some(tokens) = request.options.max_thinking_tokens {
            command.env("MAX_THINKING_TOKENS", tokens.to_string());
        }

        let mut child = command.spawn().map_err(|err| SessionError::Process {
            status: "not started".to_string(),
            stderr: format!("{}: {err}", self.binary.display()),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request.prompt.as_bytes()).await?;
            stdin.shutdown().await?;
        }
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::stream("agent stdout was not captured"))?;
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        tracing::debug!(
            binary = %self.binary.display(),
            pid = child.id(),
            "agent process spawned"
        );

        let cancellation = request.cancellation.clone();
        let stream = async_stream::stream! {
            let mut child = child;
            let mut lines = LinesStream::new(BufReader::new(stdout).lines());
            let mut line_no = 0usize;
            let mut saw_result = false;
            let mut cancelled = false;

            loop {
                let next = match &cancellation {
                    Some(handle) => tokio::select! {
                        biased;
                        _ = handle.cancelled() => Next::Cancelled,
                        line = lines.next() => Next::Line(line),
                    },
                    None => Next::Line(lines.next().await),
                };
                match next {
                    Next::Cancelled => {
                        cancelled = true;
                        let _ = child.start_kill();
                        tracing::debug!(line_no, "agent process cancelled");
                        break;
                    }
                    Next::Line(None) => break,
                    Next::Line(Some(Err(err))) => {
                        yield Err(SessionError::Io(err));
                        break;
                    }
                    Next::Line(Some(Ok(line))) => {
                        line_no += 1;
                        if line.trim().is_empty() {
                            continue;
                        }
                        match Message::from_json_line(&line) {
                            Ok(message) => {
                                saw_result |= matches!(message, Message::Result(_));
                                yield Ok(message);
                            }
                            Err(source) => {
                                yield Err(SessionError::Decode { line: line_no, source });
                                break;
                            }
                        }
                    }
                }
            }

            let status = child.wait().await;
            if cancelled || saw_result {
                return;
            }
            match status {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    let stderr = match stderr_task {
                        Some(task) => task.await.unwrap_or_default(),
                        None => String::new(),
                    };
                    yield Err(SessionError::Process {
                        status: status.to_string(),
                        stderr: tail(stderr.trim(), STDERR_TAIL_BYTES).to_string(),
                    });
                }
                Err(err) => {
                    yield Err(SessionError::Io(err));
                }
            }
        };
        Ok(Box::pin(stream))
    }
}

fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
