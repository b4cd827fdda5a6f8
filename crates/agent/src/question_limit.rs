//! Question-limit policy — rations human-facing questions.
//!
//! Counts `ask_user` tool calls. At `warn_at` it injects a one-time
//! warning; at `limit` it injects a hard stop directive and vetoes
//! further iterations. Demonstrates the general middleware pattern:
//! shaping model behavior through injected system text and enforcing a
//! hard bound through the veto.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fieldbook_core::message::Message;
use fieldbook_core::middleware::Middleware;
use fieldbook_core::tool::ToolCallRequest;
use fieldbook_core::usage::UsageContext;

/// The tool name the limiter watches for.
pub const ASK_USER_TOOL: &str = "ask_user";

/// Configuration for the question limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionLimit {
    /// Hard cap on questions; the loop is vetoed once reached.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Question count at which the one-time warning is injected.
    #[serde(default = "default_warn_at")]
    pub warn_at: u32,
}

fn default_limit() -> u32 {
    6
}

fn default_warn_at() -> u32 {
    4
}

impl Default for QuestionLimit {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            warn_at: default_warn_at(),
        }
    }
}

/// Middleware enforcing a [`QuestionLimit`] over one conversation.
pub struct QuestionLimitMiddleware {
    limit: u32,
    warn_at: u32,
    ask_count: u32,
    warning_sent: bool,
}

impl QuestionLimitMiddleware {
    pub fn new(config: QuestionLimit) -> Self {
        Self {
            limit: config.limit,
            warn_at: config.warn_at,
            ask_count: 0,
            warning_sent: false,
        }
    }

    pub fn ask_count(&self) -> u32 {
        self.ask_count
    }
}

impl Default for QuestionLimitMiddleware {
    fn default() -> Self {
        Self::new(QuestionLimit::default())
    }
}

#[async_trait]
impl Middleware for QuestionLimitMiddleware {
    async fn on_tool_call(
        &mut self,
        call: &ToolCallRequest,
        _result: &Message,
        _ctx: &UsageContext,
    ) {
        if call.name == ASK_USER_TOOL {
            self.ask_count += 1;
        }
    }

    async fn should_continue(&mut self, _iteration: usize, _ctx: &UsageContext) -> bool {
        self.ask_count < self.limit
    }

    async fn on_injections(&mut self, _messages: &[Message], _ctx: &UsageContext) -> Vec<Message> {
        if self.ask_count >= self.limit {
            return vec![Message::system(format!(
                "SYSTEM: You have reached the maximum limit of {} questions. \
                 You must now stop gathering information and proceed with what you have.",
                self.limit
            ))];
        }

        if self.ask_count >= self.warn_at && !self.warning_sent {
            self.warning_sent = true;
            return vec![Message::system(format!(
                "SYSTEM WARNING: You have asked {} questions. You are approaching the \
                 limit of {}. Please wrap up your information gathering efficiently in \
                 the next {} questions.",
                self.ask_count,
                self.limit,
                self.limit - self.ask_count
            ))];
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::AlwaysToolProvider;
    use crate::tool_loop::ToolLoop;
    use fieldbook_core::error::ToolError;
    use fieldbook_core::message::Role;
    use fieldbook_core::tool::{Tool, ToolOutput, ToolRegistry};
    use serde_json::json;
    use std::sync::Arc;

    fn ask_call() -> ToolCallRequest {
        ToolCallRequest::new("call_1", ASK_USER_TOOL, json!({"question": "name?"}))
    }

    fn result_msg() -> Message {
        Message::tool_result("call_1", ASK_USER_TOOL, "an answer")
    }

    #[tokio::test]
    async fn counts_only_ask_user_calls() {
        let mut mw = QuestionLimitMiddleware::default();
        let ctx = UsageContext::new();

        mw.on_tool_call(&ask_call(), &result_msg(), &ctx).await;
        mw.on_tool_call(
            &ToolCallRequest::new("call_2", "write_field", json!({})),
            &Message::tool_result("call_2", "write_field", "ok"),
            &ctx,
        )
        .await;

        assert_eq!(mw.ask_count(), 1);
    }

    #[tokio::test]
    async fn warning_fires_exactly_once_at_warn_at() {
        let mut mw = QuestionLimitMiddleware::new(QuestionLimit { limit: 6, warn_at: 4 });
        let ctx = UsageContext::new();

        for i in 0..4 {
            mw.on_tool_call(&ask_call(), &result_msg(), &ctx).await;
            let injections = mw.on_injections(&[], &ctx).await;
            if i < 3 {
                assert!(injections.is_empty(), "no warning before warn_at");
            } else {
                assert_eq!(injections.len(), 1);
                assert!(injections[0].content.contains("SYSTEM WARNING"));
                assert!(injections[0].content.contains("approaching the limit of 6"));
            }
        }

        // Latched: a fifth question produces no second warning.
        mw.on_tool_call(&ask_call(), &result_msg(), &ctx).await;
        assert!(mw.on_injections(&[], &ctx).await.is_empty());
    }

    #[tokio::test]
    async fn vetoes_at_limit_with_stop_directive() {
        let mut mw = QuestionLimitMiddleware::new(QuestionLimit { limit: 2, warn_at: 1 });
        let ctx = UsageContext::new();

        mw.on_tool_call(&ask_call(), &result_msg(), &ctx).await;
        assert!(mw.should_continue(1, &ctx).await);

        mw.on_tool_call(&ask_call(), &result_msg(), &ctx).await;
        assert!(!mw.should_continue(2, &ctx).await);

        let injections = mw.on_injections(&[], &ctx).await;
        assert_eq!(injections.len(), 1);
        assert!(injections[0]
            .content
            .contains("stop gathering information and proceed with what you have"));
    }

    struct CannedAnswer;

    #[async_trait]
    impl Tool for CannedAnswer {
        fn name(&self) -> &str {
            ASK_USER_TOOL
        }
        fn description(&self) -> &str {
            "Ask the user a question"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "question": { "type": "string" } },
                "required": ["question"]
            })
        }
        async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text("whatever you say"))
        }
    }

    #[tokio::test]
    async fn loop_stops_after_sixth_question() {
        // Model that asks a question every single turn.
        let provider = Arc::new(AlwaysToolProvider::new(
            ASK_USER_TOOL,
            json!({"question": "and then?"}),
        ));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(CannedAnswer)).unwrap();

        let loop_ = ToolLoop::new(provider.clone(), "mock-model").with_max_iterations(50);
        let mut middleware: Vec<Box<dyn Middleware>> =
            vec![Box::new(QuestionLimitMiddleware::default())];
        let mut ctx = UsageContext::new();

        let additions = loop_
            .run(&[Message::user("go")], &registry, &mut middleware, &mut ctx)
            .await
            .unwrap();

        assert_eq!(ctx.count(ASK_USER_TOOL), 6);
        assert_eq!(provider.call_count(), 6);

        let warnings: Vec<_> = additions
            .iter()
            .filter(|m| m.role == Role::System && m.content.contains("SYSTEM WARNING"))
            .collect();
        assert_eq!(warnings.len(), 1, "warning must fire exactly once");

        let directives: Vec<_> = additions
            .iter()
            .filter(|m| m.role == Role::System && m.content.contains("maximum limit"))
            .collect();
        assert_eq!(directives.len(), 1);
    }
}
