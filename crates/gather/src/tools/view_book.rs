//! view_book — read-only snapshot of every field in the book.

use async_trait::async_trait;

use fieldbook_core::error::ToolError;
use fieldbook_core::tool::{Tool, ToolOutput};

use super::{lock_book, SharedBook};

pub struct ViewBookTool {
    book: SharedBook,
}

impl ViewBookTool {
    pub fn new(book: SharedBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Tool for ViewBookTool {
    fn name(&self) -> &str {
        "view_book"
    }

    fn description(&self) -> &str {
        "View the current state of the info book, including all fields and their \
         current values."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let book = lock_book(&self.book)?;
        Ok(ToolOutput::text(book.summary()))
    }
}
