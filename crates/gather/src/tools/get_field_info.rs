//! get_field_info — full metadata for one field.

use async_trait::async_trait;

use fieldbook_core::error::ToolError;
use fieldbook_core::tool::{Tool, ToolOutput};

use super::{lock_book, SharedBook};

pub struct GetFieldInfoTool {
    book: SharedBook,
}

impl GetFieldInfoTool {
    pub fn new(book: SharedBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Tool for GetFieldInfoTool {
    fn name(&self) -> &str {
        "get_field_info"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific field, including its description, \
         importance, fill guidance, and current value."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "field_name": {
                    "type": "string",
                    "description": "The name of the field to get info about"
                }
            },
            "required": ["field_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let field_name = arguments
            .get("field_name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'field_name'".into()))?;

        let book = lock_book(&self.book)?;
        match book.get_field(field_name) {
            Some(field) => Ok(ToolOutput::text(field.describe())),
            None => Ok(ToolOutput::text(format!(
                "Error: Field '{field_name}' does not exist"
            ))),
        }
    }
}
