//! The seam between the chat layer and the remote conversational service.

use crate::error::Result;
use crate::types::{DetectIntentRequest, DetectIntentResponse};

/// A service that detects the intent of conversational turns.
///
/// [`DialogflowCx`](crate::DialogflowCx) talks to the real service over HTTP.
/// Any other implementation (an in-process stub, a recording proxy) can be
/// handed to [`ChatClient::with_sessions`](crate::chat::ChatClient::with_sessions).
#[async_trait::async_trait]
pub trait SessionsClient: Send + Sync {
    /// Sends one turn to the session named in `request` and returns the agent's reply.
    async fn detect_intent(&self, request: &DetectIntentRequest) -> Result<DetectIntentResponse>;
}
