//! Turn reconstruction.
//!
//! A turn opens on every user message the caller actually wrote. Synthetic
//! user messages (tool-result echoes) never open one, and assistant output
//! seen before the first turn is dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ContentBlock, Message};

/// One tool call made during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub input: Value,
    /// Always `true`: the content stream carries no execution outcome.
    pub success: bool,
}

/// One user-prompt-to-assistant-response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based position in the timeline.
    pub turn: usize,
    pub user: String,
    /// The last assistant text of the turn.
    pub assistant: String,
    pub tools: Vec<ToolInvocation>,
}

impl Turn {
    fn open(turn: usize, user: &str) -> Self {
        Self {
            turn,
            user: user.to_string(),
            assistant: String::new(),
            tools: Vec::new(),
        }
    }

    fn absorb(&mut self, content: &[ContentBlock]) {
        for block in content {
            match block {
                ContentBlock::Text { text } => {
                    self.assistant.clone_from(text);
                }
                ContentBlock::ToolUse { name, input, .. } => {
                    self.tools.push(ToolInvocation {
                        name: name.clone(),
                        input: input.clone(),
                        success: true,
                    });
                }
                ContentBlock::Image { .. }
                | ContentBlock::Thinking { .. }
                | ContentBlock::RedactedThinking { .. }
                | ContentBlock::ToolResult { .. }
                | ContentBlock::Other(_) => {}
            }
        }
    }
}

/// Fold a buffer into its turns. Pure and deterministic.
pub fn reconstruct_turns(messages: &[Message]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();
    for message in messages {
        match message {
            Message::User(user) if !user.is_synthetic() => {
                turns.push(Turn::open(turns.len() + 1, user.text()));
            }
            Message::Assistant(assistant) => {
                if let Some(current) = turns.last_mut() {
                    current.absorb(assistant.content());
                }
            }
            _ => {}
        }
    }
    turns
}
