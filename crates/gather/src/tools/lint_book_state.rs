//! lint_book_state — the convergence check: only the unfilled fields.
//!
//! The system prompt instructs the model to call this before ending the
//! conversation. Needed fields (importance > 0) come first, highest
//! importance on top; importance-0 fields are listed as optional.

use async_trait::async_trait;

use fieldbook_core::error::ToolError;
use fieldbook_core::tool::{Tool, ToolOutput};

use super::{lock_book, SharedBook};

pub struct LintBookStateTool {
    book: SharedBook,
}

impl LintBookStateTool {
    pub fn new(book: SharedBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Tool for LintBookStateTool {
    fn name(&self) -> &str {
        "lint_book_state"
    }

    fn description(&self) -> &str {
        "Get a concise list of fields that still need values, organized by required \
         vs optional. Use this before ending the conversation to ensure all required \
         fields are filled."
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

        let mut required: Vec<_> = book
            .fields()
            .iter()
            .filter(|f| f.importance > 0 && !f.is_filled())
            .collect();
        required.sort_by(|a, b| b.importance.cmp(&a.importance));

        let optional: Vec<_> = book
            .fields()
            .iter()
            .filter(|f| f.importance == 0 && !f.is_filled())
            .collect();

        let mut lines = Vec::new();
        if !required.is_empty() {
            lines.push("=== REQUIRED FIELDS (still need values) ===".to_string());
            for field in &required {
                lines.push(format!("- {}: {}", field.name, field.description));
            }
            lines.push(String::new());
        }
        if !optional.is_empty() {
            lines.push("=== OPTIONAL FIELDS (still empty) ===".to_string());
            for field in &optional {
                lines.push(format!("- {}: {}", field.name, field.description));
            }
            lines.push(String::new());
        }
        if required.is_empty() && optional.is_empty() {
            lines.push("All fields have been filled!".to_string());
        }

        Ok(ToolOutput::text(lines.join("\n")))
    }
}
