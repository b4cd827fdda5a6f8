//! The five gathering tools: a closed-loop control surface letting the
//! model inspect and write the shared [`InfoBook`].
//!
//! Every tool holds the book behind `Arc<Mutex<_>>`. The mutex renders
//! the single-session exclusive-ownership rule; it is never contended
//! across conversations and never held across an await point.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use fieldbook_core::error::ToolError;
use fieldbook_core::tool::{Tool, ToolRegistry};

use crate::book::InfoBook;

pub mod ask_user;
pub mod get_field_info;
pub mod lint_book_state;
pub mod view_book;
pub mod write_field;

pub use ask_user::AskUserTool;
pub use get_field_info::GetFieldInfoTool;
pub use lint_book_state::LintBookStateTool;
pub use view_book::ViewBookTool;
pub use write_field::WriteFieldTool;

/// A book shared between the gathering tools of one session.
pub type SharedBook = Arc<Mutex<InfoBook>>;

pub(crate) fn lock_book(book: &SharedBook) -> Result<MutexGuard<'_, InfoBook>, ToolError> {
    book.lock()
        .map_err(|_| ToolError::failed("info book lock poisoned"))
}

/// The human-input collaborator behind the ask_user tool. May take
/// arbitrarily long; no timeout is imposed here.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, ToolError>;
}

/// Build the standard gathering-tool registry over a shared book, plus
/// any caller-provided extra tools.
pub fn gathering_tools(
    book: SharedBook,
    answers: Arc<dyn AnswerSource>,
    extra: Vec<Box<dyn Tool>>,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(AskUserTool::new(answers)))?;
    registry.register(Box::new(WriteFieldTool::new(book.clone())))?;
    registry.register(Box::new(ViewBookTool::new(book.clone())))?;
    registry.register(Box::new(GetFieldInfoTool::new(book.clone())))?;
    registry.register(Box::new(LintBookStateTool::new(book)))?;
    for tool in extra {
        registry.register(tool)?;
    }
    Ok(registry)
}
