//! Per-conversation tool usage counters.
//!
//! Mutated only by the orchestrator after a tool executes; middleware and
//! tools see it read-only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counters tracking which tools have been used and how often within one
/// conversation. One instance per loop; never shared across conversations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageContext {
    pub call_counts: HashMap<String, u32>,
}

impl UsageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one use of a tool. Orchestrator-only.
    pub fn record(&mut self, tool_name: &str) {
        *self.call_counts.entry(tool_name.to_string()).or_insert(0) += 1;
    }

    /// How many times the named tool has been called.
    pub fn count(&self, tool_name: &str) -> u32 {
        self.call_counts.get(tool_name).copied().unwrap_or(0)
    }

    /// Total tool calls across all tools.
    pub fn total_calls(&self) -> u32 {
        self.call_counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_count() {
        let mut ctx = UsageContext::new();
        assert_eq!(ctx.count("ask_user"), 0);

        ctx.record("ask_user");
        ctx.record("ask_user");
        ctx.record("write_field");

        assert_eq!(ctx.count("ask_user"), 2);
        assert_eq!(ctx.count("write_field"), 1);
        assert_eq!(ctx.total_calls(), 3);
    }
}
