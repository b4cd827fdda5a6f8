//! ask_user — forward a question to the human and return the raw answer.
//!
//! This tool writes nothing; the model is expected to follow up with
//! write_field once it has extracted the relevant facts.

use std::sync::Arc;

use async_trait::async_trait;

use fieldbook_core::error::ToolError;
use fieldbook_core::tool::{Tool, ToolOutput};

use super::AnswerSource;

pub struct AskUserTool {
    answers: Arc<dyn AnswerSource>,
}

impl AskUserTool {
    pub fn new(answers: Arc<dyn AnswerSource>) -> Self {
        Self { answers }
    }
}

#[async_trait]
impl Tool for AskUserTool {
    fn name(&self) -> &str {
        "ask_user"
    }

    fn description(&self) -> &str {
        "Ask the user a question to gather information. Use this to ask open-ended \
         questions. The AI will determine which field(s) to fill based on the user's \
         answer and the available fields."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question to ask the user"
                }
            },
            "required": ["question"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let question = arguments
            .get("question")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("missing 'question'".into()))?;

        let answer = self.answers.ask(question).await?;
        Ok(ToolOutput::text(answer))
    }
}
