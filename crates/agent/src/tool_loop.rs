//! The tool-call loop orchestrator.
//!
//! One `run` drives one conversation segment: model call, tool execution,
//! middleware consultation, repeat. Tool calls within a turn execute
//! strictly in the order the model emitted them — never in parallel — so
//! transcript ordering and the shared registry see a single writer.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use fieldbook_core::error::ProviderError;
use fieldbook_core::event::{EventBus, LoopEvent};
use fieldbook_core::message::Message;
use fieldbook_core::middleware::Middleware;
use fieldbook_core::provider::{Provider, ProviderRequest, SamplingOptions};
use fieldbook_core::tool::ToolRegistry;
use fieldbook_core::usage::UsageContext;

/// Default cap on tool-executing iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// The orchestrator for one conversation's tool-call loop.
pub struct ToolLoop {
    provider: Arc<dyn Provider>,
    model: String,
    sampling: SamplingOptions,
    max_iterations: usize,
    event_bus: Option<Arc<EventBus>>,
}

impl ToolLoop {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            sampling: SamplingOptions::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            event_bus: None,
        }
    }

    /// Set the hard bound on tool-executing iterations.
    ///
    /// This is the loop's only cancellation mechanism: there is no
    /// external token and no preemptive timeout.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Override the sampling options sent with every model call.
    pub fn with_sampling(mut self, sampling: SamplingOptions) -> Self {
        self.sampling = sampling;
        self
    }

    /// Attach an event bus for display-only loop events.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    fn publish(&self, event: LoopEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    /// Run the loop and return the transcript additions (assistant
    /// messages, tool results, and middleware injections) in order.
    ///
    /// Ordering is part of the model-facing contract: each assistant
    /// message is followed by its tool results in call order, then by any
    /// injected messages. Provider failures propagate to the caller;
    /// every tool-level failure is converted into an error-string tool
    /// result and the loop continues.
    pub async fn run(
        &self,
        initial: &[Message],
        tools: &ToolRegistry,
        middleware: &mut [Box<dyn Middleware>],
        ctx: &mut UsageContext,
    ) -> Result<Vec<Message>, ProviderError> {
        let mut current: Vec<Message> = initial.to_vec();
        let mut additions: Vec<Message> = Vec::new();
        let tool_definitions = tools.definitions();
        let mut iterations_run = 0;

        info!(
            model = %self.model,
            tools = tool_definitions.len(),
            messages = current.len(),
            "Starting tool-call loop"
        );

        'outer: for iteration in 0..self.max_iterations {
            for mw in middleware.iter_mut() {
                mw.on_before_llm_call(&current, ctx).await;
            }

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: current.clone(),
                sampling: self.sampling.clone(),
                tools: tool_definitions.clone(),
                response_schema: None,
                stream: false,
            };

            let response = self.provider.complete(request).await?;
            let assistant = response.message;

            for mw in middleware.iter_mut() {
                mw.on_after_llm_call(&assistant, ctx).await;
            }

            self.publish(LoopEvent::AssistantMessage {
                content_preview: assistant.content.chars().take(120).collect(),
                tool_call_count: assistant.tool_calls.len(),
                timestamp: Utc::now(),
            });

            if assistant.tool_calls.is_empty() {
                // Final text response — the model stopped itself.
                additions.push(assistant.clone());
                current.push(assistant);
                break;
            }

            iterations_run = iteration + 1;
            debug!(
                iteration = iterations_run,
                tool_calls = assistant.tool_calls.len(),
                "Executing tool calls"
            );

            let calls = assistant.tool_calls.clone();
            additions.push(assistant.clone());
            current.push(assistant);

            for call in &calls {
                self.publish(LoopEvent::ToolCallStarted {
                    tool_name: call.name.clone(),
                    timestamp: Utc::now(),
                });

                let start = std::time::Instant::now();
                let mut force_stop = false;

                let (content, success) = match tools.get(&call.name) {
                    None => {
                        warn!(tool = %call.name, "Model requested unknown tool");
                        (format!("Error: Unknown tool '{}'", call.name), false)
                    }
                    Some(tool) => match tool.execute(call.arguments.clone()).await {
                        Ok(output) => {
                            force_stop = output.force_stop;
                            (output.content, true)
                        }
                        Err(e) => {
                            warn!(tool = %call.name, error = %e, "Tool execution failed");
                            (format!("Error: {e}"), false)
                        }
                    },
                };

                ctx.record(&call.name);

                let result_msg = Message::tool_result(&call.id, &call.name, &content);
                additions.push(result_msg.clone());
                current.push(result_msg.clone());

                for mw in middleware.iter_mut() {
                    mw.on_tool_call(call, &result_msg, ctx).await;
                }

                self.publish(LoopEvent::ToolResult {
                    tool_name: call.name.clone(),
                    success,
                    duration_ms: start.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                });

                if force_stop {
                    // Remaining calls of this turn are skipped and the
                    // loop ends regardless of middleware votes.
                    info!(tool = %call.name, "Tool requested force stop");
                    break 'outer;
                }
            }

            // Veto-by-any, then union of injections. Injections from the
            // vetoing pass still land so the model sees the directive if
            // the conversation is resumed.
            let mut proceed = true;
            for mw in middleware.iter_mut() {
                if !mw.should_continue(iterations_run, ctx).await {
                    proceed = false;
                }
            }

            for mw in middleware.iter_mut() {
                for injected in mw.on_injections(&current, ctx).await {
                    additions.push(injected.clone());
                    current.push(injected);
                }
            }

            if !proceed {
                info!(iteration = iterations_run, "Middleware vetoed continuation");
                break;
            }
        }

        if iterations_run >= self.max_iterations {
            warn!(
                iterations = iterations_run,
                max = self.max_iterations,
                "Tool loop hit iteration bound"
            );
        }

        self.publish(LoopEvent::LoopComplete {
            iterations: iterations_run,
            additions: additions.len(),
            timestamp: Utc::now(),
        });

        Ok(additions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        make_tool_call, make_tool_call_response, AlwaysToolProvider, ScriptedProvider,
    };
    use async_trait::async_trait;
    use fieldbook_core::error::ToolError;
    use fieldbook_core::message::Role;
    use fieldbook_core::tool::{Tool, ToolOutput};
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(
                arguments["text"].as_str().unwrap_or("").to_string(),
            ))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
            Err(ToolError::failed("disk on fire"))
        }
    }

    struct StopTool;

    #[async_trait]
    impl Tool for StopTool {
        fn name(&self) -> &str {
            "stop"
        }
        fn description(&self) -> &str {
            "Ends the conversation"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::stopping("stopping now"))
        }
    }

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool)).unwrap();
        registry
    }

    #[tokio::test]
    async fn text_only_response_ends_loop() {
        let provider = Arc::new(ScriptedProvider::single_text("Hello! How can I help?"));
        let loop_ = ToolLoop::new(provider.clone(), "mock-model");

        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(
                &[Message::user("Hello!")],
                &echo_registry(),
                &mut [],
                &mut ctx,
            )
            .await
            .unwrap();

        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].role, Role::Assistant);
        assert_eq!(additions[0].content, "Hello! How can I help?");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(ctx.total_calls(), 0);
    }

    #[tokio::test]
    async fn tool_call_then_answer_preserves_order() {
        let provider = Arc::new(ScriptedProvider::tool_then_answer(
            vec![make_tool_call("echo", json!({"text": "ping"}))],
            "let me check",
            "pong",
        ));
        let loop_ = ToolLoop::new(provider, "mock-model");

        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(
                &[Message::user("echo ping")],
                &echo_registry(),
                &mut [],
                &mut ctx,
            )
            .await
            .unwrap();

        // assistant (with call), its tool result, final assistant
        assert_eq!(additions.len(), 3);
        assert_eq!(additions[0].role, Role::Assistant);
        assert!(additions[0].has_tool_calls());
        assert_eq!(additions[1].role, Role::Tool);
        assert_eq!(additions[1].content, "ping");
        assert_eq!(additions[1].tool_call_id.as_deref(), Some("call_echo"));
        assert_eq!(additions[1].tool_name.as_deref(), Some("echo"));
        assert_eq!(additions[2].role, Role::Assistant);
        assert_eq!(additions[2].content, "pong");
        assert_eq!(ctx.count("echo"), 1);
    }

    #[tokio::test]
    async fn unknown_tool_yields_error_string_result() {
        let provider = Arc::new(ScriptedProvider::tool_then_answer(
            vec![make_tool_call("frobnicate", json!({}))],
            "",
            "done",
        ));
        let loop_ = ToolLoop::new(provider, "mock-model");

        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(&[Message::user("go")], &echo_registry(), &mut [], &mut ctx)
            .await
            .unwrap();

        assert_eq!(additions[1].role, Role::Tool);
        assert_eq!(additions[1].content, "Error: Unknown tool 'frobnicate'");
        // Recoverable: the loop went on to the final answer.
        assert_eq!(additions.last().unwrap().content, "done");
    }

    #[tokio::test]
    async fn tool_execution_failure_is_converted_not_propagated() {
        let provider = Arc::new(ScriptedProvider::tool_then_answer(
            vec![make_tool_call("failing", json!({}))],
            "",
            "recovered",
        ));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FailingTool)).unwrap();

        let loop_ = ToolLoop::new(provider, "mock-model");
        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(&[Message::user("go")], &registry, &mut [], &mut ctx)
            .await
            .unwrap();

        assert!(additions[1].content.starts_with("Error: "));
        assert!(additions[1].content.contains("disk on fire"));
        assert_eq!(additions.last().unwrap().content, "recovered");
    }

    #[tokio::test]
    async fn loop_never_exceeds_iteration_bound() {
        let provider = Arc::new(AlwaysToolProvider::new("echo", json!({"text": "again"})));
        let loop_ = ToolLoop::new(provider.clone(), "mock-model").with_max_iterations(5);

        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(&[Message::user("go")], &echo_registry(), &mut [], &mut ctx)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 5);
        assert_eq!(ctx.count("echo"), 5);
        // 5 iterations x (assistant + tool result)
        assert_eq!(additions.len(), 10);
    }

    #[tokio::test]
    async fn force_stop_skips_remaining_calls_and_ends_loop() {
        let provider = Arc::new(ScriptedProvider::new(vec![make_tool_call_response(
            vec![
                make_tool_call("stop", json!({})),
                make_tool_call("echo", json!({"text": "never"})),
            ],
            "",
        )]));
        let mut registry = echo_registry();
        registry.register(Box::new(StopTool)).unwrap();

        let loop_ = ToolLoop::new(provider.clone(), "mock-model");
        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(&[Message::user("go")], &registry, &mut [], &mut ctx)
            .await
            .unwrap();

        // assistant + one tool result; the second call never executed and
        // no further model call was made.
        assert_eq!(additions.len(), 2);
        assert_eq!(additions[1].content, "stopping now");
        assert_eq!(ctx.count("echo"), 0);
        assert_eq!(provider.call_count(), 1);
    }

    struct VetoAfterFirst;

    #[async_trait]
    impl Middleware for VetoAfterFirst {
        async fn should_continue(&mut self, iteration: usize, _ctx: &UsageContext) -> bool {
            iteration < 1
        }
    }

    #[tokio::test]
    async fn middleware_veto_stops_loop() {
        let provider = Arc::new(AlwaysToolProvider::new("echo", json!({"text": "x"})));
        let loop_ = ToolLoop::new(provider.clone(), "mock-model");

        let mut middleware: Vec<Box<dyn Middleware>> = vec![Box::new(VetoAfterFirst)];
        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(
                &[Message::user("go")],
                &echo_registry(),
                &mut middleware,
                &mut ctx,
            )
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(additions.len(), 2);
    }

    struct InjectOnce {
        injected: bool,
    }

    #[async_trait]
    impl Middleware for InjectOnce {
        async fn on_injections(
            &mut self,
            _messages: &[Message],
            _ctx: &UsageContext,
        ) -> Vec<Message> {
            if self.injected {
                return Vec::new();
            }
            self.injected = true;
            vec![Message::system("SYSTEM: be brief")]
        }
    }

    #[tokio::test]
    async fn injections_append_after_tool_results() {
        let provider = Arc::new(ScriptedProvider::tool_then_answer(
            vec![make_tool_call("echo", json!({"text": "hi"}))],
            "",
            "bye",
        ));
        let loop_ = ToolLoop::new(provider, "mock-model");

        let mut middleware: Vec<Box<dyn Middleware>> =
            vec![Box::new(InjectOnce { injected: false })];
        let mut ctx = UsageContext::new();
        let additions = loop_
            .run(
                &[Message::user("go")],
                &echo_registry(),
                &mut middleware,
                &mut ctx,
            )
            .await
            .unwrap();

        // assistant, tool result, injected system, final assistant
        assert_eq!(additions.len(), 4);
        assert_eq!(additions[2].role, Role::System);
        assert_eq!(additions[2].content, "SYSTEM: be brief");
        assert_eq!(additions[3].content, "bye");
    }

    #[tokio::test]
    async fn events_are_published() {
        let bus = Arc::new(EventBus::new(64));
        let mut rx = bus.subscribe();

        let provider = Arc::new(ScriptedProvider::tool_then_answer(
            vec![make_tool_call("echo", json!({"text": "hi"}))],
            "",
            "bye",
        ));
        let loop_ = ToolLoop::new(provider, "mock-model").with_event_bus(bus);

        let mut ctx = UsageContext::new();
        loop_
            .run(&[Message::user("go")], &echo_registry(), &mut [], &mut ctx)
            .await
            .unwrap();

        let mut saw_tool_result = false;
        let mut saw_complete = false;
        while let Ok(event) = rx.try_recv() {
            match event.as_ref() {
                LoopEvent::ToolResult { tool_name, .. } => {
                    assert_eq!(tool_name, "echo");
                    saw_tool_result = true;
                }
                LoopEvent::LoopComplete { .. } => saw_complete = true,
                _ => {}
            }
        }
        assert!(saw_tool_result);
        assert!(saw_complete);
    }
}
