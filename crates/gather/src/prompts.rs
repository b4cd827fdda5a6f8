//! System prompt assembly for gathering conversations.
//!
//! The base template carries `{goal_section}`, `{vibe_section}`,
//! `{fields_section}`, and `{tools_section}` placeholders, substituted by
//! plain string replacement so a custom base can reuse any subset of
//! them.

use crate::book::InfoBook;
use crate::field::InfoGatherField;

pub const DEFAULT_GATHER_SYSTEM_BASE: &str = "\
You are an information gathering assistant. Your task is to collect information from the user through conversation.

{goal_section}

CONVERSATION FLOW:
1. Check which fields are still needed (use lint_book_state or view_book)
2. Ask questions to gather any remaining needed information
3. When new information comes from the user, extract anything relevant and write to the info book
4. Assess if you should continue gathering more info or if the current set is sufficient
5. Repeat from step 1 or finish, by not calling any tools

IMPORTANT:
- When starting the conversation, ask BROAD questions that can capture multiple fields at once
- After capturing the critical/high importance fields, continue gathering medium/low importance fields based on their priority
- For fields with importance \"none\", only fill them if the user explicitly mentions them - do not actively ask about these
- When writing to fields, include MAXIMUM information available - if the user mentions 2 details about a field, include both in the field value
- Before ending the conversation, use the view book state to verify all required fields have been filled

Key principles:
- Fill fields in the info book whenever the user provides new information that maps to a field and satisfies its fill guidance.
- Extract relevant details from the user's responses even if you didn't specifically ask about them
- Ask broader questions at the start to efficiently capture multiple fields, then ask more specific questions later to fill remaining fields
- You can combine multiple related questions in a single ask_user call to gather several fields at once
- Don't be overly rigid - adapt to the flow of conversation
- When user signals they want to finish (e.g., \"just do it\", \"that's enough\", \"go ahead\"), stop asking and proceed
- Continue the conversation to gather more fields based on importance level, even after required fields are filled

{vibe_section}

{fields_section}

{tools_section}

Remember: Your goal is to gather all needed information through natural conversation. Update the info book as new information becomes available.";

fn importance_label(field: &InfoGatherField) -> String {
    if field.importance == 0 {
        "importance none".to_string()
    } else {
        format!("importance {}", field.importance)
    }
}

fn fields_section(book: &InfoBook) -> String {
    if book.fields().is_empty() {
        return String::new();
    }
    let mut ordered: Vec<&InfoGatherField> = book.fields().iter().collect();
    ordered.sort_by(|a, b| b.importance.cmp(&a.importance));

    let mut lines = vec!["FIELDS TO GATHER:".to_string()];
    for field in ordered {
        lines.push(format!(
            "- {} ({}, {}): {}",
            field.name,
            importance_label(field),
            field.fill_guidance,
            field.description
        ));
    }
    lines.join("\n")
}

/// Assemble the full system prompt for one gathering session.
///
/// `custom_base` replaces [`DEFAULT_GATHER_SYSTEM_BASE`] entirely when
/// provided. `tools_section` is pre-rendered by the caller (it knows the
/// registry); pass an empty string to omit it.
pub fn build_system_prompt(
    book: &InfoBook,
    custom_base: Option<&str>,
    conversation_character: Option<&str>,
    tools_section: &str,
) -> String {
    let goal_section = if book.goal.is_empty() {
        String::new()
    } else {
        format!("GOAL: {}", book.goal)
    };
    let vibe_section = conversation_character
        .map(|c| format!("CONVERSATION STYLE: {c}"))
        .unwrap_or_default();

    custom_base
        .unwrap_or(DEFAULT_GATHER_SYSTEM_BASE)
        .replace("{goal_section}", &goal_section)
        .replace("{vibe_section}", &vibe_section)
        .replace("{fields_section}", &fields_section(book))
        .replace("{tools_section}", tools_section)
        .trim()
        .to_string()
}
