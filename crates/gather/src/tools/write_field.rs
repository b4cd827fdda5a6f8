//! write_field — validate-then-commit a value into the book.
//!
//! Domain failures (unknown field, validation rejection) are returned as
//! Ok content prefixed "Error: " so the model can retry with a corrected
//! value. A `ToolError` is reserved for malformed arguments.

use async_trait::async_trait;

use fieldbook_core::error::ToolError;
use fieldbook_core::tool::{Tool, ToolOutput};

use super::{lock_book, SharedBook};

pub struct WriteFieldTool {
    book: SharedBook,
}

impl WriteFieldTool {
    pub fn new(book: SharedBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Tool for WriteFieldTool {
    fn name(&self) -> &str {
        "write_field"
    }

    fn description(&self) -> &str {
        "Write a value to a field in the info book. Use this to save information \
         you've gathered from the user."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "field_name": {
                    "type": "string",
                    "description": "The name of the field to write to"
                },
                "value": {
                    "type": "string",
                    "description": "The value to write to the field"
                }
            },
            "required": ["field_name", "value"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let field_name = arguments
            .get("field_name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'field_name'".into()))?;

        // Models sometimes emit bare numbers or booleans; coerce scalars
        // to their text form rather than rejecting the call.
        let value = match arguments.get("value") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => {
                return Err(ToolError::InvalidArguments("missing 'value'".into()));
            }
            Some(other) => other.to_string(),
        };

        let mut book = lock_book(&self.book)?;
        match book.set_field_value(field_name, &value) {
            Ok(()) => Ok(ToolOutput::text(format!(
                "Successfully wrote '{value}' to field '{field_name}'"
            ))),
            Err(err) => Ok(ToolOutput::text(format!("Error: {err}"))),
        }
    }
}
