//! The bare result string.

use serde::{Deserialize, Serialize};

use crate::metrics::first_result;
use crate::types::{Message, ResultSubtype};

pub const MAX_TURNS_ADVICE: &str = "Error: Maximum turns reached. Increase max_turns or set it to 0.";
pub const EXECUTION_FAILED_ADVICE: &str =
    "Error: Execution failed. Enable debug mode for details.";
pub const NO_RESPONSE: &str = "No response generated";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOutput {
    pub result: String,
}

impl TextOutput {
    /// First match wins: successful result text, max-turns advice,
    /// execution-failure advice, last assistant text, then [`NO_RESPONSE`].
    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            result: final_text(messages).to_string(),
        }
    }
}

fn final_text(messages: &[Message]) -> &str {
    if let Some(result) = first_result(messages) {
        match &result.subtype {
            ResultSubtype::Success => {
                if let Some(text) = result.result.as_deref().filter(|t| !t.is_empty()) {
                    return text;
                }
            }
            ResultSubtype::ErrorMaxTurns => return MAX_TURNS_ADVICE,
            ResultSubtype::ErrorDuringExecution => return EXECUTION_FAILED_ADVICE,
            ResultSubtype::Other(_) => {}
        }
    }

    messages
        .iter()
        .rev()
        .find_map(Message::as_assistant)
        .and_then(|last| last.first_text())
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_RESPONSE)
}
