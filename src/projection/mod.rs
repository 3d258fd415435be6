//! Consumer-facing views of a collected buffer.
//!
//! Each projection is a pure function of the buffer: formatting the same
//! messages twice yields identical output.

pub mod full;
pub mod summary;
pub mod text;

pub use full::{FullOutput, InitInfo, ParsedSession, ResultBlock};
pub use summary::{SummaryOutput, SystemInfo};
pub use text::{TextOutput, EXECUTION_FAILED_ADVICE, MAX_TURNS_ADVICE, NO_RESPONSE};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::types::Message;

/// Which projection to emit for an item.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Just the final answer.
    Text,
    /// Key metrics and the result.
    #[default]
    Summary,
    /// Every message plus the reconstructed timeline.
    Full,
}

/// One projection of a buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Projection {
    Text(TextOutput),
    Summary(SummaryOutput),
    Full(FullOutput),
}

impl Projection {
    /// Build the projection selected by `format`.
    pub fn render(format: OutputFormat, messages: &[Message]) -> Self {
        match format {
            OutputFormat::Text => Self::Text(TextOutput::from_messages(messages)),
            OutputFormat::Summary => Self::Summary(SummaryOutput::from_messages(messages)),
            OutputFormat::Full => Self::Full(FullOutput::from_messages(messages)),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Text(_) => OutputFormat::Text,
            Self::Summary(_) => OutputFormat::Summary,
            Self::Full(_) => OutputFormat::Full,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!(OutputFormat::from_str("FULL").unwrap(), OutputFormat::Full);
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn render_matches_requested_format() {
        for format in [OutputFormat::Text, OutputFormat::Summary, OutputFormat::Full] {
            assert_eq!(Projection::render(format, &[]).format(), format);
        }
    }
}
