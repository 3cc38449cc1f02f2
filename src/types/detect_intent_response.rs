use serde::{Deserialize, Serialize};

use crate::types::QueryResult;

/// The response of a detect-intent request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentResponse {
    /// Unique identifier of the response.
    #[serde(default)]
    pub response_id: String,

    /// The result of the conversational query.
    #[serde(default)]
    pub query_result: QueryResult,
}

impl DetectIntentResponse {
    /// Returns the text fragments of all text-bearing messages, in order.
    pub fn text_fragments(&self) -> impl Iterator<Item = &str> {
        self.query_result
            .response_messages
            .iter()
            .flat_map(|m| m.text_fragments())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_full_response() {
        let response: DetectIntentResponse = serde_json::from_value(json!({
            "responseId": "b7e1",
            "queryResult": {
                "text": "I want a pizza",
                "languageCode": "en",
                "responseMessages": [
                    {"text": {"text": ["What size?"]}},
                    {"payload": {"chips": ["small", "large"]}},
                    {"text": {"text": ["We have small and large."]}}
                ],
                "match": {
                    "intent": {"name": "projects/p/.../intents/1", "displayName": "order.pizza"},
                    "matchType": "INTENT",
                    "confidence": 0.93
                },
                "currentPage": {"name": "projects/p/.../pages/size", "displayName": "Size"},
                "parameters": {"topping": "cheese"},
                "intentDetectionConfidence": 0.93,
                "diagnosticInfo": {"ignored": true}
            }
        }))
        .unwrap();

        assert_eq!(response.response_id, "b7e1");
        assert_eq!(
            response.query_result.intent_display_name(),
            Some("order.pizza")
        );
        assert_eq!(
            response.query_result.current_page.as_ref().map(|p| p.display_name.as_str()),
            Some("Size")
        );
        let fragments: Vec<&str> = response.text_fragments().collect();
        assert_eq!(fragments, ["What size?", "We have small and large."]);
    }

    #[test]
    fn deserialize_minimal_response() {
        let response: DetectIntentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.query_result.response_messages.is_empty());
        assert_eq!(response.text_fragments().count(), 0);
        assert_eq!(response.query_result.intent_display_name(), None);
    }
}
