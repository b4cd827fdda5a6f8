//! The field registry: an ordered set of typed fields plus a goal.
//!
//! The book is exclusively owned by one gathering session. The tools
//! share it behind a mutex (see [`crate::tools`]); within the book itself
//! there is no locking and no partial mutation.

use serde::{Deserialize, Serialize};

use fieldbook_core::error::FieldError;

use crate::field::InfoGatherField;

/// The registry of facts one gathering conversation aims to fill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoBook {
    /// What the gathered information is for; rendered into the system
    /// prompt.
    pub goal: String,

    fields: Vec<InfoGatherField>,
}

impl InfoBook {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field. Names are unique within a book: the first field under
    /// a name wins and a duplicate is rejected.
    pub fn add_field(&mut self, field: InfoGatherField) -> bool {
        if self.get_field(&field.name).is_some() {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Remove a field by name. Returns whether a field was removed.
    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.name != name);
        self.fields.len() != before
    }

    pub fn get_field(&self, name: &str) -> Option<&InfoGatherField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut InfoGatherField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// All fields, in insertion order.
    pub fn fields(&self) -> &[InfoGatherField] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Validate-then-commit a value into a named field.
    pub fn set_field_value(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        match self.get_field_mut(name) {
            Some(field) => field.set_value(value),
            None => Err(FieldError::UnknownField(name.to_string())),
        }
    }

    pub fn unfilled_fields(&self) -> Vec<&InfoGatherField> {
        self.fields.iter().filter(|f| !f.is_filled()).collect()
    }

    /// Fields at or above an importance threshold.
    pub fn fields_at_importance(&self, min: u8) -> Vec<&InfoGatherField> {
        self.fields.iter().filter(|f| f.importance >= min).collect()
    }

    /// Unfilled fields the fallback filler may attempt.
    pub fn fallback_candidates(&self) -> Vec<&InfoGatherField> {
        self.fields
            .iter()
            .filter(|f| !f.is_filled() && f.fallback_enabled)
            .collect()
    }

    /// The session is complete when every field with importance > 0 is
    /// filled. Importance-0 fields never block completion.
    pub fn is_complete(&self) -> bool {
        self.fields
            .iter()
            .all(|f| f.importance == 0 || f.is_filled())
    }

    /// Snapshot of all fields ordered by descending importance, with
    /// filled/empty markers. Used by the view_book tool and the report
    /// writer.
    pub fn summary(&self) -> String {
        let mut ordered: Vec<&InfoGatherField> = self.fields.iter().collect();
        ordered.sort_by(|a, b| b.importance.cmp(&a.importance));

        let mut lines = vec!["=== Info Book State ===".to_string()];
        for field in ordered {
            let marker = if field.is_filled() { "[FILLED]" } else { "[EMPTY]" };
            let value = if field.is_filled() {
                field.value()
            } else {
                "(not set)"
            };
            lines.push(format!("{marker} {}: {value}", field.name));
            lines.push(format!("  Description: {}", field.description));
            lines.push(format!("  Importance: {}", field.importance));
            lines.push(String::new());
        }
        lines.join("\n")
    }
}
