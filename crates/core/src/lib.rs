//! # Fieldbook Core
//!
//! Domain types, traits, and error definitions for the fieldbook
//! information-gathering agent. This crate defines the contracts that the
//! loop orchestrator and the gathering layer implement against:
//!
//! - the conversation [`message`] model (an append-only transcript),
//! - the [`tool`] contract the model can invoke,
//! - the [`middleware`] hooks threaded through each loop iteration,
//! - the [`provider`] abstraction over LLM backends,
//! - the per-conversation [`usage`] counters,
//! - the observational [`event`] bus.
//!
//! All crates depend inward on core; the dependency graph is acyclic by
//! construction.

pub mod error;
pub mod event;
pub mod message;
pub mod middleware;
pub mod provider;
pub mod tool;
pub mod usage;

// Re-export key types at crate root for ergonomics
pub use error::{Error, FieldError, ProviderError, Result, ToolError};
pub use event::{EventBus, LoopEvent};
pub use message::{Message, Role, Transcript};
pub use middleware::Middleware;
pub use provider::{
    Provider, ProviderRequest, ProviderResponse, SamplingOptions, StreamChunk, ToolDefinition,
    Usage,
};
pub use tool::{Tool, ToolCallRequest, ToolOutput, ToolRegistry};
pub use usage::UsageContext;
