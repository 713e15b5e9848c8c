//! State normalizer
//!
//! Coerces any JSON value into the canonical `FormDocument` shape. The
//! function is total: malformed input degrades to defaults, it is never
//! rejected. Unknown keys are dropped, array order is kept as is.

use serde_json::Value;

use crate::document::{
    FormDocument, Question, QuestionOption, Section, SubOption, DEFAULT_QUESTION_TYPE,
    NO_FOLLOW_UP,
};
use crate::utils::{flag, string_or};

/// Normalize an untrusted value into a `FormDocument`.
///
/// A top level that is not an object with a `sections` array yields the
/// empty document; nothing is salvaged from it.
pub fn normalize(state: &Value) -> FormDocument {
    let Some(sections) = state.get("sections").and_then(Value::as_array) else {
        return FormDocument::empty();
    };

    FormDocument {
        sections: sections.iter().map(normalize_section).collect(),
    }
}

fn normalize_section(section: &Value) -> Section {
    Section {
        id: string_or(section, "id", ""),
        title: string_or(section, "title", ""),
        questions: map_array(section, "questions", normalize_question),
    }
}

fn normalize_question(question: &Value) -> Question {
    Question {
        id: string_or(question, "id", ""),
        kind: string_or(question, "type", DEFAULT_QUESTION_TYPE),
        label: string_or(question, "label", ""),
        required: flag(question, "required"),
        options: map_array(question, "options", normalize_option),
    }
}

fn normalize_option(option: &Value) -> QuestionOption {
    QuestionOption {
        id: string_or(option, "id", ""),
        text: string_or(option, "text", ""),
        follow_up: string_or(option, "followUp", NO_FOLLOW_UP),
        sub_options: map_array(option, "subOptions", normalize_sub_option),
    }
}

fn normalize_sub_option(sub_option: &Value) -> SubOption {
    SubOption {
        text: string_or(sub_option, "text", ""),
    }
}

/// Maps `container[key]` element-wise, or returns an empty Vec if it is not an array.
fn map_array<T>(container: &Value, key: &str, f: fn(&Value) -> T) -> Vec<T> {
    container
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(f).collect())
        .unwrap_or_default()
}
