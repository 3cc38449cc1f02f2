use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ResponseMessage;

/// The intent matched by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Resource name of the intent.
    #[serde(default)]
    pub name: String,

    /// Human-readable name of the intent.
    #[serde(default)]
    pub display_name: String,
}

/// How the input of a turn was matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// The matched intent, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,

    /// Kind of match, e.g. `INTENT` or `NO_MATCH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,

    /// Confidence of the match in `[0.0, 1.0]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A page of the agent's flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Resource name of the page.
    #[serde(default)]
    pub name: String,

    /// Human-readable name of the page.
    #[serde(default)]
    pub display_name: String,
}

/// The result of a conversational query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// The original text of the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// The language that was triggered during intent detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    /// The messages the agent replied with, in order.
    #[serde(default)]
    pub response_messages: Vec<ResponseMessage>,

    /// How the query was matched.
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_: Option<Match>,

    /// The page the conversation is on after this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<Page>,

    /// Session parameters collected so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,

    /// Confidence of the intent detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent_detection_confidence: Option<f64>,
}

impl QueryResult {
    /// Returns the display name of the matched intent, if any.
    pub fn intent_display_name(&self) -> Option<&str> {
        self.match_
            .as_ref()
            .and_then(|m| m.intent.as_ref())
            .map(|i| i.display_name.as_str())
            .filter(|name| !name.is_empty())
    }
}
