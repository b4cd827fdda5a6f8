//! Typed, validated field slots.
//!
//! A field is one named fact the gathering session wants to learn. Each
//! field carries an importance weight (0 = never actively ask), a fill
//! guidance policy, and an optional fallback configuration consumed by
//! the filler after the conversation ends. Values only enter through
//! [`InfoGatherField::set_value`], which validates before committing, so
//! a filled field always holds a value that passed its kind's rule.

use serde::{Deserialize, Serialize};

use fieldbook_core::error::FieldError;

/// How aggressively a field may be filled from inference versus an
/// explicit user statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillGuidance {
    /// Only fill from an explicit user statement
    #[default]
    ExplicitOnly,
    /// May be filled from a strong hint in conversation
    HintAllowed,
    /// May be filled with a sensible default when unstated
    DefaultFillable,
    /// May be filled with any plausible value
    Randomizable,
    /// Never fill automatically under any circumstances
    Never,
}

impl std::fmt::Display for FillGuidance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FillGuidance::ExplicitOnly => "explicit-only",
            FillGuidance::HintAllowed => "hint-allowed",
            FillGuidance::DefaultFillable => "default-fillable",
            FillGuidance::Randomizable => "randomizable",
            FillGuidance::Never => "never",
        };
        write!(f, "{s}")
    }
}

/// The closed set of field value types. Validation is dispatched by
/// pattern matching; there is no open type hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Choice { options: Vec<String> },
}

impl FieldKind {
    /// Check a trimmed candidate value against this kind's rule.
    fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            FieldKind::Text => Ok(()),
            FieldKind::Integer => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| "must be an integer".to_string()),
            FieldKind::Float => value
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| "must be a number".to_string()),
            FieldKind::Boolean => {
                if parse_boolean(value).is_some() {
                    Ok(())
                } else {
                    Err("must be a boolean (true/false or yes/no)".to_string())
                }
            }
            FieldKind::Choice { options } => {
                if options.iter().any(|o| o.eq_ignore_ascii_case(value)) {
                    Ok(())
                } else {
                    Err(format!("must be one of: {}", options.join(", ")))
                }
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Choice { .. } => "choice",
        }
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// One named, typed slot in an [`crate::InfoBook`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoGatherField {
    pub name: String,
    pub description: String,

    /// The committed value. Empty means unfilled; writes go through
    /// `set_value` only.
    #[serde(default)]
    value: String,

    pub kind: FieldKind,

    /// 0..=10. Zero means "never actively ask, passively accept".
    #[serde(default = "default_importance")]
    pub importance: u8,

    #[serde(default)]
    pub fill_guidance: FillGuidance,

    /// Whether the fallback filler may attempt this field.
    #[serde(default)]
    pub fallback_enabled: bool,

    /// Committed when the filler cannot infer a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_default: Option<String>,
}

fn default_importance() -> u8 {
    5
}

impl InfoGatherField {
    fn base(name: impl Into<String>, description: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: String::new(),
            kind,
            importance: default_importance(),
            fill_guidance: FillGuidance::default(),
            fallback_enabled: false,
            fallback_default: None,
        }
    }

    /// A free-text field.
    pub fn text(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::base(name, description, FieldKind::Text)
    }

    /// An integer field.
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::base(name, description, FieldKind::Integer)
    }

    /// A floating-point field.
    pub fn float(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::base(name, description, FieldKind::Float)
    }

    /// A boolean field (accepts true/false and yes/no).
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::base(name, description, FieldKind::Boolean)
    }

    /// A field restricted to a fixed set of options (matched
    /// case-insensitively).
    pub fn choice(
        name: impl Into<String>,
        description: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self::base(name, description, FieldKind::Choice { options })
    }

    /// Set the importance weight, clamped to 0..=10.
    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance.min(10);
        self
    }

    pub fn with_fill_guidance(mut self, guidance: FillGuidance) -> Self {
        self.fill_guidance = guidance;
        self
    }

    /// Enable the fallback filler for this field with a default value to
    /// commit when nothing can be inferred.
    pub fn with_fallback(mut self, default: impl Into<String>) -> Self {
        self.fallback_enabled = true;
        self.fallback_default = Some(default.into());
        self
    }

    /// Enable the fallback filler without a default: inference or nothing.
    pub fn with_fallback_inference(mut self) -> Self {
        self.fallback_enabled = true;
        self
    }

    /// Validate-then-commit. On failure the stored value is untouched; on
    /// success exactly the trimmed value is stored.
    pub fn set_value(&mut self, value: &str) -> Result<(), FieldError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Empty(self.name.clone()));
        }
        self.kind
            .validate(trimmed)
            .map_err(|reason| FieldError::Invalid {
                field: self.name.clone(),
                reason,
            })?;
        self.value = trimmed.to_string();
        Ok(())
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// A filled field always holds a value that passed validation, since
    /// `set_value` is the only write path.
    pub fn is_filled(&self) -> bool {
        !self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.value.parse().ok()
    }

    pub fn as_float(&self) -> Option<f64> {
        self.value.parse().ok()
    }

    pub fn as_boolean(&self) -> Option<bool> {
        parse_boolean(&self.value)
    }

    /// Full metadata rendering, as surfaced by the get_field_info tool.
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("=== Field: {} ===", self.name)];
        lines.push(format!("Description: {}", self.description));
        lines.push(format!("Type: {}", self.kind.label()));
        if let FieldKind::Choice { options } = &self.kind {
            lines.push(format!("Options: {}", options.join(", ")));
        }
        lines.push(format!("Importance: {}", self.importance));
        lines.push(format!("Fill guidance: {}", self.fill_guidance));
        lines.push(format!(
            "Fallback AI enabled: {}",
            if self.fallback_enabled { "Yes" } else { "No" }
        ));
        if let Some(default) = &self.fallback_default {
            lines.push(format!("Fallback default: {default}"));
        }
        lines.push(format!(
            "Filled: {}",
            if self.is_filled() { "Yes" } else { "No" }
        ));
        lines.push(format!(
            "Current value: {}",
            if self.value.is_empty() {
                "(not set)"
            } else {
                self.value.as_str()
            }
        ));
        lines.join("\n")
    }
}
