//! The fallback filler: one non-looping structured model call that tries
//! to complete unfilled fallback-enabled fields from the finished
//! transcript.
//!
//! Per returned entry: a real value goes through validate-then-commit
//! exactly like write_field; the `CANNOT_INFER` sentinel commits the
//! field's declared default, if any. A malformed structured payload is
//! logged and treated as zero inferred fields.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use fieldbook_core::error::Error;
use fieldbook_core::message::{Message, Transcript};
use fieldbook_core::provider::{Provider, ProviderRequest, SamplingOptions};

use crate::tools::SharedBook;

/// Sentinel the model returns for a field it cannot infer.
pub const CANNOT_INFER: &str = "CANNOT_INFER";

const FALLBACK_PROMPT_TEMPLATE: &str = "\
You are a fallback system for filling missing information. Analyze the conversation below and try to infer the values for the following unfilled required fields:

{fields_info}

Conversation so far:
{conversation}

Based on the conversation, provide the value for each field if it can be reasonably inferred. If you cannot infer a value, use \"CANNOT_INFER\" as the value.

Respond with a JSON object containing a \"fields\" array. Each field should have \"field_name\" and \"value\" keys.

Example:
{\"fields\": [{\"field_name\": \"name\", \"value\": \"John\"}, {\"field_name\": \"age\", \"value\": \"CANNOT_INFER\"}]}

Only include fields where you can make a reasonable inference.";

#[derive(Debug, Deserialize)]
struct FallbackFieldValue {
    field_name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct FallbackResponse {
    fields: Vec<FallbackFieldValue>,
}

fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "fields": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "field_name": { "type": "string" },
                        "value": { "type": "string" }
                    },
                    "required": ["field_name", "value"]
                }
            }
        },
        "required": ["fields"]
    })
}

/// Attempt to fill the book's fallback candidates from the transcript.
/// Returns how many fields were committed. A no-op when there are no
/// candidates; provider failures propagate to the caller.
pub async fn fill_unfilled_fields(
    provider: &Arc<dyn Provider>,
    model: &str,
    sampling: &SamplingOptions,
    transcript: &Transcript,
    book: &SharedBook,
) -> Result<usize, Error> {
    let fields_info = {
        let guard = book
            .lock()
            .map_err(|_| Error::Internal("info book lock poisoned".into()))?;
        let candidates = guard.fallback_candidates();
        if candidates.is_empty() {
            return Ok(0);
        }
        let mut lines = Vec::new();
        for field in candidates {
            lines.push(format!("- {}: {}", field.name, field.description));
            if let Some(default) = &field.fallback_default {
                lines.push(format!("  Default if cannot infer: {default}"));
            }
        }
        lines.join("\n")
    };

    let prompt = FALLBACK_PROMPT_TEMPLATE
        .replace("{fields_info}", &fields_info)
        .replace("{conversation}", &transcript.render_plain());

    let mut request = ProviderRequest::new(model, vec![Message::user(prompt)]);
    request.sampling = sampling.clone();
    request.response_schema = Some(response_schema());

    let response = provider.complete(request).await?;

    let payload = match &response.message.parsed {
        Some(value) => serde_json::from_value::<FallbackResponse>(value.clone()),
        None => serde_json::from_str::<FallbackResponse>(&response.message.content),
    };
    let parsed = match payload {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "failed to parse fallback response, nothing inferred");
            return Ok(0);
        }
    };

    let mut guard = book
        .lock()
        .map_err(|_| Error::Internal("info book lock poisoned".into()))?;
    let mut filled = 0;
    for entry in parsed.fields {
        let Some(field) = guard.get_field_mut(&entry.field_name) else {
            continue;
        };
        if field.is_filled() {
            continue;
        }
        if !entry.value.eq_ignore_ascii_case(CANNOT_INFER) {
            match field.set_value(&entry.value) {
                Ok(()) => filled += 1,
                Err(err) => {
                    debug!(field = %entry.field_name, error = %err, "inferred value failed validation");
                }
            }
        } else if let Some(default) = field.fallback_default.clone() {
            if field.set_value(&default).is_ok() {
                filled += 1;
            }
        }
    }
    Ok(filled)
}
