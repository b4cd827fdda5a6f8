//! The gathering driver: wires the book, the tools, the question-limit
//! middleware, the loop, and the fallback filler into one call.
//!
//! Completion is not enforced here. Callers check `book.is_complete()`
//! after the conversation and decide whether to proceed, retry, or
//! abort.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use fieldbook_agent::question_limit::{QuestionLimit, QuestionLimitMiddleware};
use fieldbook_agent::tool_loop::{ToolLoop, DEFAULT_MAX_ITERATIONS};
use fieldbook_core::error::Error;
use fieldbook_core::message::{Message, Transcript};
use fieldbook_core::middleware::Middleware;
use fieldbook_core::provider::{Provider, SamplingOptions};
use fieldbook_core::usage::UsageContext;

use crate::fallback::fill_unfilled_fields;
use crate::prompts::build_system_prompt;
use crate::tools::{gathering_tools, AnswerSource, SharedBook};

/// Tunables for one gathering conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatherOptions {
    /// Opening user message. When absent, a nudge toward the first
    /// unfilled field is generated instead.
    #[serde(default)]
    pub initial_prompt: Option<String>,

    /// Replaces the default system prompt base entirely when set.
    #[serde(default)]
    pub system_prompt_base: Option<String>,

    /// Style/vibe instructions rendered into the system prompt.
    #[serde(default)]
    pub conversation_character: Option<String>,

    /// Whether to list the registered tools in the system prompt.
    #[serde(default = "default_describe_tools")]
    pub describe_tools: bool,

    /// Question rationing; `None` disables the limiter.
    #[serde(default = "default_question_limit")]
    pub question_limit: Option<QuestionLimit>,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default)]
    pub sampling: SamplingOptions,
}

fn default_describe_tools() -> bool {
    true
}

fn default_question_limit() -> Option<QuestionLimit> {
    Some(QuestionLimit::default())
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

impl Default for GatherOptions {
    fn default() -> Self {
        Self {
            initial_prompt: None,
            system_prompt_base: None,
            conversation_character: None,
            describe_tools: default_describe_tools(),
            question_limit: default_question_limit(),
            max_iterations: default_max_iterations(),
            sampling: SamplingOptions::default(),
        }
    }
}

/// Run one information-gathering conversation against the shared book.
/// Returns the transcript additions produced by the loop; the book is
/// mutated in place, including by the fallback filler.
pub async fn gather_conversation(
    provider: Arc<dyn Provider>,
    model: &str,
    book: SharedBook,
    answers: Arc<dyn AnswerSource>,
    options: GatherOptions,
) -> Result<Vec<Message>, Error> {
    let registry = gathering_tools(book.clone(), answers, Vec::new())?;

    let tools_section = if options.describe_tools {
        let mut lines = vec!["You have access to the following tools:".to_string()];
        for def in registry.definitions() {
            lines.push(format!("- {}: {}", def.name, def.description));
        }
        lines.join("\n")
    } else {
        String::new()
    };

    let mut messages = Vec::new();
    {
        let guard = book
            .lock()
            .map_err(|_| Error::Internal("info book lock poisoned".into()))?;
        messages.push(Message::system(build_system_prompt(
            &guard,
            options.system_prompt_base.as_deref(),
            options.conversation_character.as_deref(),
            &tools_section,
        )));
        if let Some(prompt) = &options.initial_prompt {
            messages.push(Message::user(prompt.clone()));
        } else if let Some(first) = guard.unfilled_fields().first() {
            messages.push(Message::user(format!(
                "Please help me gather the following information: {}",
                first.description
            )));
        }
    }

    let mut middleware: Vec<Box<dyn Middleware>> = Vec::new();
    if let Some(limit) = options.question_limit.clone() {
        middleware.push(Box::new(QuestionLimitMiddleware::new(limit)));
    }
    let mut ctx = UsageContext::new();

    let tool_loop = ToolLoop::new(provider.clone(), model)
        .with_max_iterations(options.max_iterations)
        .with_sampling(options.sampling.clone());
    let additions = tool_loop
        .run(&messages, &registry, &mut middleware, &mut ctx)
        .await?;

    let needs_fallback = {
        let guard = book
            .lock()
            .map_err(|_| Error::Internal("info book lock poisoned".into()))?;
        !guard.fallback_candidates().is_empty()
    };
    if needs_fallback {
        let mut all = messages.clone();
        all.extend(additions.iter().cloned());
        let transcript = Transcript::from_messages(all);
        let filled =
            fill_unfilled_fields(&provider, model, &options.sampling, &transcript, &book).await?;
        info!(filled, "fallback filler committed inferred values");
    }

    Ok(additions)
}
