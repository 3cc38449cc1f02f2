use serde::{Deserialize, Serialize};

/// Natural language text to be processed by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInput {
    /// The UTF-8 encoded natural language text.
    pub text: String,
}

impl TextInput {
    /// Creates a new text input.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The input of a single conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInput {
    /// The text input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextInput>,

    /// The language of the input, e.g. `en`.
    pub language_code: String,
}

impl QueryInput {
    /// Creates a query carrying the given text in the given language.
    pub fn text(text: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            text: Some(TextInput::new(text)),
            language_code: language_code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_query_serialization() {
        let query = QueryInput::text("I want a pizza", "en");
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"text": {"text": "I want a pizza"}, "languageCode": "en"})
        );
    }
}
