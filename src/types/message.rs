//! Protocol messages emitted by the agent runtime.
//!
//! Known message types decode into typed structs. Fields this crate does not
//! interpret are kept in a flattened `extra` map so a message serializes back
//! to what the runtime sent.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::result::ResultMessage;

/// One message from the agent's output stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    System(SystemMessage),
    User(UserMessage),
    Assistant(AssistantMessage),
    Result(ResultMessage),
    StreamEvent(StreamEventMessage),
    /// A message type this crate does not know about, carried through untouched.
    Unknown(Value),
}

impl Message {
    /// Decode a message from its JSON form.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let Value::Object(mut object) = value else {
            return Ok(Self::Unknown(value));
        };
        let kind = match object.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            None => return Ok(Self::Unknown(Value::Object(object))),
        };
        // The tag is re-added on serialization; leaving it in would duplicate
        // it through the flattened `extra` map.
        object.remove("type");
        let message = match kind.as_str() {
            "system" => Self::System(serde_json::from_value(Value::Object(object))?),
            "user" => Self::User(serde_json::from_value(Value::Object(object))?),
            "assistant" => Self::Assistant(serde_json::from_value(Value::Object(object))?),
            "result" => Self::Result(serde_json::from_value(Value::Object(object))?),
            "stream_event" => Self::StreamEvent(serde_json::from_value(Value::Object(object))?),
            _ => {
                object.insert("type".to_string(), Value::String(kind.clone()));
                Self::Unknown(Value::Object(object))
            }
        };
        Ok(message)
    }

    /// Decode one line of newline-delimited JSON.
    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        Self::from_value(serde_json::from_str(line)?)
    }

    /// Create a human-authored user message with plain text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self::User(UserMessage {
            message: UserPayload {
                content: UserContent::Text(text.into()),
                extra: role("user"),
            },
            is_synthetic: None,
            extra: Map::new(),
        })
    }

    /// Create a runtime-generated user message (e.g. a tool-result echo).
    pub fn synthetic_user(content: Vec<ContentBlock>) -> Self {
        Self::User(UserMessage {
            message: UserPayload {
                content: UserContent::Blocks(content),
                extra: role("user"),
            },
            is_synthetic: Some(true),
            extra: Map::new(),
        })
    }

    /// Create an assistant message from content blocks.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self::Assistant(AssistantMessage {
            message: AssistantPayload {
                content,
                model: None,
                extra: role("assistant"),
            },
            extra: Map::new(),
        })
    }

    /// The wire `type` of this message.
    pub fn kind(&self) -> &str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::Assistant(_) => "assistant",
            Self::Result(_) => "result",
            Self::StreamEvent(_) => "stream_event",
            Self::Unknown(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    /// The wire `subtype`, when the message type has one.
    pub fn subtype(&self) -> Option<&str> {
        match self {
            Self::System(system) => Some(system.subtype.as_str()),
            Self::Result(result) => Some(result.subtype.as_str()),
            Self::Unknown(value) => value.get("subtype").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn is_stream_event(&self) -> bool {
        matches!(self, Self::StreamEvent(_))
    }

    /// The session metadata message, if this is `system/init`.
    pub fn as_init(&self) -> Option<&SystemMessage> {
        match self {
            Self::System(system) if system.is_init() => Some(system),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserMessage> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Self::Assistant(assistant) => Some(assistant),
            _ => None,
        }
    }

    pub fn as_result(&self) -> Option<&ResultMessage> {
        match self {
            Self::Result(result) => Some(result),
            _ => None,
        }
    }
}

fn role(role: &str) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("role".to_string(), Value::String(role.to_string()));
    extra
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedRef<'a> {
    System(&'a SystemMessage),
    User(&'a UserMessage),
    Assistant(&'a AssistantMessage),
    Result(&'a ResultMessage),
    StreamEvent(&'a StreamEventMessage),
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::System(m) => TaggedRef::System(m).serialize(serializer),
            Self::User(m) => TaggedRef::User(m).serialize(serializer),
            Self::Assistant(m) => TaggedRef::Assistant(m).serialize(serializer),
            Self::Result(m) => TaggedRef::Result(m).serialize(serializer),
            Self::StreamEvent(m) => TaggedRef::StreamEvent(m).serialize(serializer),
            Self::Unknown(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

/// A `system` message. Session metadata lives on the `init` subtype.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemMessage {
    pub subtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(
        rename = "permissionMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub permission_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServerStatus>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SystemMessage {
    pub fn is_init(&self) -> bool {
        self.subtype == "init"
    }
}

/// Connection status of an attached MCP server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpServerStatus {
    pub name: String,
    pub status: String,
}

/// A `user` message, human-authored or runtime-generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserMessage {
    pub message: UserPayload,
    #[serde(rename = "isSynthetic", default, skip_serializing_if = "Option::is_none")]
    pub is_synthetic: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserMessage {
    /// Whether the runtime injected this message rather than the caller.
    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic.unwrap_or(false)
    }

    /// The message text: the whole string for plain content, otherwise the
    /// first text block, otherwise empty.
    pub fn text(&self) -> &str {
        match &self.message.content {
            UserContent::Text(text) => text,
            UserContent::Blocks(blocks) => blocks
                .iter()
                .find_map(ContentBlock::as_text)
                .unwrap_or_default(),
        }
    }
}

/// Inner payload of a user message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPayload {
    #[serde(default)]
    pub content: UserContent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User content is either a plain string or a list of blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for UserContent {
    fn default() -> Self {
        Self::Blocks(Vec::new())
    }
}

/// An `assistant` message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantMessage {
    pub message: AssistantPayload,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssistantMessage {
    pub fn content(&self) -> &[ContentBlock] {
        &self.message.content
    }

    /// First text block of this message.
    pub fn first_text(&self) -> Option<&str> {
        self.message.content.iter().find_map(ContentBlock::as_text)
    }
}

/// Inner payload of an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantPayload {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A low-level partial-output signal. Opaque to aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamEventMessage {
    #[serde(default)]
    pub event: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single part of message content.
///
/// Block kinds without a typed variant decode into [`ContentBlock::Other`]
/// and serialize back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        source: Value,
    },
    Thinking {
        thinking: String,
        #[serde(default)]
        signature: String,
    },
    RedactedThinking {
        data: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// `server_tool_use`, `web_search_tool_result`, `document` and the like.
    #[serde(untagged)]
    Other(Value),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: Value, is_error: bool) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: Some(content),
            is_error: Some(is_error),
        }
    }

    /// The wire `type` of this block.
    pub fn kind(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Thinking { .. } => "thinking",
            Self::RedactedThinking { .. } => "redacted_thinking",
            Self::ToolUse { .. } => "tool_use",
            Self::ToolResult { .. } => "tool_result",
            Self::Other(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Image { .. }
            | Self::Thinking { .. }
            | Self::RedactedThinking { .. }
            | Self::ToolUse { .. }
            | Self::ToolResult { .. }
            | Self::Other(_) => None,
        }
    }
}
