//! CLI entry point for sessionfold.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::RelayConfig;
use crate::projection::OutputFormat;
use crate::session::{PermissionMode, SessionMode, SessionOptions, SystemPromptMode};

/// Drive agent sessions and fold their message streams into JSON.
#[derive(Parser, Debug)]
#[command(name = "sessionfold", version, about = "Agent session runner and stream digester")]
pub struct Cli {
    /// Config file (default: $SESSIONFOLD_CONFIG or ~/.sessionfold/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one live session through the agent CLI
    Run(RunArgs),
    /// Fold a recorded stream-json transcript
    Digest(DigestArgs),
    /// Run a JSON array of items sequentially
    Batch(BatchArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Prompt text
    pub prompt: String,

    #[arg(long, default_value = "new")]
    pub mode: SessionMode,

    /// Session to resume or fork
    #[arg(long)]
    pub session_id: Option<String>,

    #[arg(long)]
    pub cwd: Option<String>,

    #[arg(short, long)]
    pub model: Option<String>,

    #[arg(long)]
    pub permission_mode: Option<PermissionMode>,

    /// 0 means no limit
    #[arg(long, default_value_t = 0)]
    pub max_turns: i64,

    /// Seconds; 0 means no timeout
    #[arg(long, default_value_t = 0.0)]
    pub timeout: f64,

    #[arg(long, default_value_t = 0)]
    pub max_thinking_tokens: i64,

    #[arg(short, long, default_value = "summary")]
    pub format: OutputFormat,

    #[arg(long, conflicts_with = "system_prompt")]
    pub append_system_prompt: Option<String>,

    /// Replace the default system prompt
    #[arg(long)]
    pub system_prompt: Option<String>,

    #[arg(long)]
    pub fallback_model: Option<String>,

    /// Repeatable
    #[arg(long = "allowed-tool")]
    pub allowed_tools: Vec<String>,

    /// Repeatable
    #[arg(long = "disallowed-tool")]
    pub disallowed_tools: Vec<String>,

    /// Repeatable
    #[arg(long = "add-dir")]
    pub additional_directories: Vec<String>,

    #[arg(long)]
    pub include_partial_messages: bool,

    #[arg(long)]
    pub debug: bool,
}

impl RunArgs {
    pub fn into_options(self, config: &RelayConfig) -> SessionOptions {
        let (system_prompt_mode, append_system_prompt, custom_system_prompt) =
            match (self.append_system_prompt, self.system_prompt) {
                (_, Some(custom)) => (SystemPromptMode::Custom, None, Some(custom)),
                (Some(append), None) => (SystemPromptMode::Append, Some(append), None),
                (None, None) => (SystemPromptMode::Default, None, None),
            };
        SessionOptions {
            mode: self.mode,
            session_id: self.session_id,
            prompt: self.prompt,
            cwd: self.cwd,
            model: self.model.unwrap_or_else(|| config.default_model.clone()),
            permission_mode: self.permission_mode.unwrap_or(config.default_permission_mode),
            max_turns: self.max_turns,
            timeout_secs: self.timeout,
            output_format: self.format,
            system_prompt_mode,
            append_system_prompt,
            custom_system_prompt,
            fallback_model: self.fallback_model,
            max_thinking_tokens: self.max_thinking_tokens,
            allowed_tools: self.allowed_tools,
            disallowed_tools: self.disallowed_tools,
            additional_directories: self.additional_directories,
            debug: self.debug || config.debug,
            include_partial_messages: self.include_partial_messages,
        }
    }
}

/// Arguments for the `digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Newline-delimited JSON transcript
    pub transcript: PathBuf,

    #[arg(short, long, default_value = "summary")]
    pub format: OutputFormat,

    /// Keep stream_event messages in the buffer
    #[arg(long)]
    pub include_stream_events: bool,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON array of item options
    pub items: PathBuf,

    /// Emit error records instead of stopping at the first failure
    #[arg(long)]
    pub continue_on_fail: bool,
}
