//! Form document model
//!
//! The single persisted aggregate: sections → questions → options → sub-options.
//! Field order here is the field order of the stored JSON.

use serde::{Deserialize, Serialize};

/// Root aggregate. Section order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDocument {
    pub sections: Vec<Section>,
}

impl FormDocument {
    /// The document served before anything has been written.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// Free-form widget tag, e.g. "text", "radio", "checkbox"
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub required: bool,
    pub options: Vec<QuestionOption>,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: DEFAULT_QUESTION_TYPE.to_string(),
            label: String::new(),
            required: false,
            options: Vec::new(),
        }
    }
}

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    /// Branching tag; "none" when the option does not branch
    pub follow_up: String,
    pub sub_options: Vec<SubOption>,
}

impl Default for QuestionOption {
    fn default() -> Self {
        Self {
            id: String::new(),
            text: String::new(),
            follow_up: NO_FOLLOW_UP.to_string(),
            sub_options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubOption {
    pub text: String,
}

/// Where the single form document is stored unless configured otherwise.
pub const DEFAULT_FORM_PATHNAME: &str = "form/form.json";

pub const DEFAULT_QUESTION_TYPE: &str = "text";
pub const NO_FOLLOW_UP: &str = "none";
