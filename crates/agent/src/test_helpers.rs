//! Shared test helpers for loop tests.

use std::sync::Mutex;

use fieldbook_core::error::ProviderError;
use fieldbook_core::message::Message;
use fieldbook_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use fieldbook_core::tool::ToolCallRequest;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    call_count: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
        }
    }

    /// A provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// A provider that first returns tool calls, then a final answer.
    pub fn tool_then_answer(calls: Vec<ToolCallRequest>, thought: &str, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(calls, thought),
            make_text_response(answer),
        ])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let responses = self.responses.lock().unwrap();

        if *count >= responses.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }

        let response = responses[*count].clone();
        *count += 1;
        Ok(response)
    }
}

/// A provider that requests the same tool call on every turn, forever.
/// Used to exercise the iteration bound and the question limiter.
pub struct AlwaysToolProvider {
    tool_name: String,
    arguments: serde_json::Value,
    call_count: Mutex<usize>,
}

impl AlwaysToolProvider {
    pub fn new(tool_name: &str, arguments: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            arguments,
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for AlwaysToolProvider {
    fn name(&self) -> &str {
        "always_tool_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        Ok(make_tool_call_response(
            vec![ToolCallRequest::new(
                format!("call_{}", *count),
                &self.tool_name,
                self.arguments.clone(),
            )],
            "",
        ))
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(calls: Vec<ToolCallRequest>, thought: &str) -> ProviderResponse {
    let mut msg = Message::assistant(thought);
    msg.tool_calls = calls;
    ProviderResponse {
        message: msg,
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}

/// Helper to create a tool call with a deterministic id.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> ToolCallRequest {
    ToolCallRequest::new(format!("call_{name}"), name, args)
}
