use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The text portion of a response message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseText {
    /// The text fragments, in the order the agent produced them.
    #[serde(default)]
    pub text: Vec<String>,

    /// Whether a playing audio reply may be interrupted by the end user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_playback_interruption: Option<bool>,
}

/// One unit of an agent's reply.
///
/// A message may carry text, a custom payload, or a signal such as the end of
/// the interaction.  Only text-bearing messages contribute to the reply shown
/// in the terminal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    /// Text reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<ResponseText>,

    /// Custom payload defined by the agent designer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Map<String, Value>>,

    /// Present when the agent ended the interaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_interaction: Option<Value>,

    /// Channel the message is intended for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl ResponseMessage {
    /// Creates a text message with the given fragments.
    pub fn text<S: Into<String>>(fragments: impl IntoIterator<Item = S>) -> Self {
        Self {
            text: Some(ResponseText {
                text: fragments.into_iter().map(Into::into).collect(),
                allow_playback_interruption: None,
            }),
            ..Self::default()
        }
    }

    /// Returns the text fragments of this message; empty if it carries no text.
    pub fn text_fragments(&self) -> &[String] {
        self.text.as_ref().map_or(&[][..], |t| t.text.as_slice())
    }

    /// Returns true if the agent signalled the end of the interaction.
    pub fn is_end_interaction(&self) -> bool {
        self.end_interaction.is_some()
    }
}
