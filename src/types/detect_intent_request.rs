use serde::{Deserialize, Serialize};

use crate::types::QueryInput;

/// A request to detect the intent of one conversational turn.
///
/// The session is carried in the URL of the request rather than in its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentRequest {
    /// The session resource name, see [`AgentPath::session_path`](crate::AgentPath::session_path).
    #[serde(skip)]
    pub session: String,

    /// The input of this turn.
    pub query_input: QueryInput,
}

impl DetectIntentRequest {
    /// Creates a request for `session` carrying `query_input`.
    pub fn new(session: impl Into<String>, query_input: QueryInput) -> Self {
        Self {
            session: session.into(),
            query_input,
        }
    }
}
