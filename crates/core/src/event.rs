//! Loop event system — an observational side channel.
//!
//! The orchestrator publishes events as the conversation progresses so
//! front-ends can display activity (streamed text, tool spinners) without
//! coupling to loop internals. Events never feed back into loop state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Events published during a tool-call loop run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoopEvent {
    /// The model produced an assistant message
    AssistantMessage {
        content_preview: String,
        tool_call_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tool call is about to execute
    ToolCallStarted {
        tool_name: String,
        timestamp: DateTime<Utc>,
    },

    /// A tool call finished (successfully or with an error result)
    ToolResult {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A raw streaming fragment from the backend (display only)
    StreamChunk {
        delta: String,
        timestamp: DateTime<Utc>,
    },

    /// The loop finished
    LoopComplete {
        iterations: usize,
        additions: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for loop events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Publishing
/// with no subscribers is a no-op.
pub struct EventBus {
    sender: broadcast::Sender<Arc<LoopEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: LoopEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<LoopEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
