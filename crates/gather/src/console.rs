//! Stdin-backed answer source for interactive sessions.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use fieldbook_core::error::ToolError;

use crate::tools::AnswerSource;

/// Prints the question to stdout and reads one line from stdin. Waits
/// indefinitely; there is no input timeout.
#[derive(Debug, Default)]
pub struct ConsoleAnswerSource;

#[async_trait]
impl AnswerSource for ConsoleAnswerSource {
    async fn ask(&self, question: &str) -> Result<String, ToolError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("\n{question}\n> ").as_bytes())
            .await
            .map_err(|e| ToolError::failed(format!("stdout write failed: {e}")))?;
        stdout
            .flush()
            .await
            .map_err(|e| ToolError::failed(format!("stdout flush failed: {e}")))?;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| ToolError::failed(format!("stdin read failed: {e}")))?;

        Ok(line.trim().to_string())
    }
}
