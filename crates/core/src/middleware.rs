//! Middleware — pluggable observer/policy hooks around each loop iteration.
//!
//! A middleware instance is opaque state threaded through one
//! conversation. Hooks run in registration order. `should_continue` is
//! veto-by-any; `on_injections` is union. Middleware never mutates the
//! transcript directly — injected messages are returned to the
//! orchestrator, which owns the single append point.

use async_trait::async_trait;

use crate::message::Message;
use crate::tool::ToolCallRequest;
use crate::usage::UsageContext;

/// Observer and policy hooks invoked by the tool-call loop.
///
/// All hooks have no-op defaults; implement only what the policy needs.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Called before each model call, with the transcript about to be sent.
    async fn on_before_llm_call(&mut self, _messages: &[Message], _ctx: &UsageContext) {}

    /// Called after each model call with the assembled assistant message.
    async fn on_after_llm_call(&mut self, _assistant: &Message, _ctx: &UsageContext) {}

    /// Called after each tool call completes, with the request and the
    /// tool result message that was appended for it.
    async fn on_tool_call(
        &mut self,
        _call: &ToolCallRequest,
        _result: &Message,
        _ctx: &UsageContext,
    ) {
    }

    /// Vote on whether the loop should run another iteration. Any single
    /// `false` stops the loop.
    async fn should_continue(&mut self, _iteration: usize, _ctx: &UsageContext) -> bool {
        true
    }

    /// Messages to append to the transcript at the end of the iteration
    /// (typically system-level warnings or directives).
    async fn on_injections(&mut self, _messages: &[Message], _ctx: &UsageContext) -> Vec<Message> {
        Vec::new()
    }
}
