//! Message and Transcript domain types.
//!
//! These are the value objects the whole system moves around: the caller
//! seeds a transcript, the loop appends assistant turns and tool results,
//! middleware appends injected system notes, and the fallback filler reads
//! the finished transcript back as plain text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tool::ToolCallRequest;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (gathering goal, rules, injected directives)
    System,
    /// The human being interviewed
    User,
    /// The model
    Assistant,
    /// A tool execution result
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        write!(f, "{s}")
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// If this is a tool result, the name of the tool that produced it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Reasoning trace emitted alongside an assistant message, when the
    /// backend surfaces one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,

    /// Structured payload parsed from the content when a response schema
    /// was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<serde_json::Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn base(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
            thinking: None,
            parsed: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::base(Role::System, content)
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::base(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::base(Role::Assistant, content)
    }

    /// Create a tool result message, correlated to the call that produced it.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut msg = Self::base(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg.tool_name = Some(tool_name.into());
        msg
    }

    /// Whether this assistant message requests any tool invocations.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// An append-only ordered message history, exclusively owned by one
/// conversation session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Append a message. The orchestrator is the single append point
    /// during a loop run.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Flatten the transcript to readable plain text, one line per entry.
    ///
    /// Tool calls and tool results are rendered inline so a downstream
    /// inference pass sees everything the model and the user said:
    ///
    /// ```text
    /// user: we're called Acme
    /// assistant (tool call): write_field({"field_name":"company_name",...})
    /// tool result (write_field): Successfully wrote ...
    /// ```
    pub fn render_plain(&self) -> String {
        let mut lines = Vec::with_capacity(self.messages.len());
        for msg in &self.messages {
            match msg.role {
                Role::Assistant => {
                    if !msg.content.is_empty() {
                        lines.push(format!("{}: {}", msg.role, msg.content));
                    }
                    for tc in &msg.tool_calls {
                        lines.push(format!(
                            "{} (tool call): {}({})",
                            msg.role, tc.name, tc.arguments
                        ));
                    }
                }
                Role::Tool => {
                    let name = msg.tool_name.as_deref().unwrap_or("unknown");
                    lines.push(format!("tool result ({}): {}", name, msg.content));
                }
                _ => lines.push(format!("{}: {}", msg.role, msg.content)),
            }
        }
        lines.join("\n")
    }
}
