//! # Fieldbook Gather
//!
//! The information-gathering layer: a typed field registry
//! ([`InfoBook`]), the five gathering tools the model drives it with,
//! the system prompt assembly, the question-limited conversation driver,
//! and the fallback filler that completes remaining fields from context
//! after the conversation ends.
//!
//! Typical use: build a book, pick an answer source, then call
//! [`gather_conversation`]. Check `book.is_complete()` afterwards; the
//! driver never enforces completion itself.

pub mod book;
pub mod console;
pub mod conversation;
pub mod fallback;
pub mod field;
pub mod prompts;
pub mod report;
pub mod tools;

pub use book::InfoBook;
pub use console::ConsoleAnswerSource;
pub use conversation::{gather_conversation, GatherOptions};
pub use fallback::{fill_unfilled_fields, CANNOT_INFER};
pub use field::{FieldKind, FillGuidance, InfoGatherField};
pub use report::write_report;
pub use tools::{
    gathering_tools, AnswerSource, AskUserTool, GetFieldInfoTool, LintBookStateTool, SharedBook,
    ViewBookTool, WriteFieldTool,
};
