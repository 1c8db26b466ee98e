//! The question label shown next to the canvas and its input field.

use crate::config::DEFAULT_QUESTION;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trimmed, non-empty question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuestionLabel(String);

impl QuestionLabel {
    /// Trim `text` and wrap it. Returns `None` for blank input.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for QuestionLabel {
    fn default() -> Self {
        Self(DEFAULT_QUESTION.to_string())
    }
}

impl fmt::Display for QuestionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for QuestionLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "question must not be blank".to_string())
    }
}

impl From<QuestionLabel> for String {
    fn from(label: QuestionLabel) -> Self {
        label.0
    }
}

/// Text input plus the label currently on display.
///
/// The displayed label only changes through [`QuestionInput::accept`], which
/// callers invoke once the collector confirmed the update.
#[derive(Debug, Clone)]
pub struct QuestionInput {
    text: String,
    displayed: QuestionLabel,
}

impl QuestionInput {
    pub fn new(displayed: QuestionLabel) -> Self {
        Self {
            text: String::new(),
            displayed,
        }
    }

    /// Current contents of the input field.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The label on display.
    pub fn displayed(&self) -> &QuestionLabel {
        &self.displayed
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn pop_char(&mut self) {
        self.text.pop();
    }

    /// Validate the input for submission. Blank input yields `None` and
    /// leaves the field untouched.
    pub fn submission(&self) -> Option<QuestionLabel> {
        QuestionLabel::parse(&self.text)
    }

    /// Show `label` and clear the input field.
    pub fn accept(&mut self, label: QuestionLabel) {
        self.displayed = label;
        self.text.clear();
    }
}
