//! The tool-call loop — the heart of fieldbook.
//!
//! The orchestrator repeats a simple cycle:
//!
//! 1. **Call the model** with the full transcript and the tool schemas
//! 2. **If tool calls**: execute them in model order, append the results
//! 3. **Consult middleware**: veto-by-any `should_continue`, then append
//!    any injected messages
//! 4. Repeat until the model stops requesting tools or the iteration
//!    bound is reached
//!
//! The loop never interprets middleware semantics — it only sequences the
//! hooks. Policy (like rationing human-facing questions) lives in the
//! middleware implementations.

pub mod question_limit;
pub mod tool_loop;

pub use question_limit::{QuestionLimit, QuestionLimitMiddleware};
pub use tool_loop::ToolLoop;

#[cfg(test)]
pub(crate) mod test_helpers;
