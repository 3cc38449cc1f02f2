//! Core chat client.
//!
//! This module provides [`ChatClient`], which turns one line of user text
//! into one reply string by way of a [`SessionsClient`].

use crate::chat::config::{ChatConfig, DEFAULT_LANGUAGE_CODE};
use crate::error::{Error, Result};
use crate::observability::{CHAT_EMPTY_REPLIES, CHAT_FAILED_TURNS, CHAT_TURNS};
use crate::sessions::SessionsClient;
use crate::types::{AgentPath, DetectIntentRequest, DetectIntentResponse, QueryInput};
use crate::DialogflowCx;

/// The session and language a conversation is currently using.
///
/// The chat loop owns this and passes it to every turn; the client itself
/// holds no per-conversation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Session id, the last segment of the session path.
    pub session_id: String,
    /// Language of user input.
    pub language_code: String,
}

impl SessionContext {
    /// Creates a context for `session_id` in the default language.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }

    /// Sets the language code.
    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }
}

impl From<&ChatConfig> for SessionContext {
    fn from(config: &ChatConfig) -> Self {
        SessionContext::new(config.session_id.clone()).with_language_code(&config.language_code)
    }
}

/// One exchange between the user and the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    /// Session the turn was sent to.
    pub session_id: String,
    /// What the user typed.
    pub user_text: String,
    /// The agent's reply: `None` if the call failed, `Some("")` if the agent
    /// answered without any text.
    pub bot_text: Option<String>,
}

impl ConversationTurn {
    /// Returns the reply if it has any text to show.
    pub fn displayable_reply(&self) -> Option<&str> {
        self.bot_text.as_deref().filter(|text| !text.is_empty())
    }
}

/// Joins every text fragment of every text-bearing message with single spaces,
/// preserving the order the service returned them in.
///
/// A response without text yields the empty string.
pub fn extract_reply_text(response: &DetectIntentResponse) -> String {
    response.text_fragments().collect::<Vec<_>>().join(" ")
}

/// A client for one conversational agent.
pub struct ChatClient<S: SessionsClient = DialogflowCx> {
    agent: AgentPath,
    sessions: S,
}

impl ChatClient<DialogflowCx> {
    /// Creates a client for the agent, connecting to its regional endpoint with
    /// ambient credentials.
    ///
    /// The identifiers are not validated here; a malformed value is reported by
    /// the service on the first call.
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Result<Self> {
        let agent = AgentPath::new(project_id, location, agent_id);
        let sessions =
            DialogflowCx::new(&agent.location)?.with_quota_project(agent.project_id.clone());
        Ok(Self::with_sessions(agent, sessions))
    }

    /// Creates a client from a resolved configuration.
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let agent = config.agent.clone();
        let sessions = DialogflowCx::with_options(
            &agent.location,
            config.endpoint.clone(),
            config.timeout,
            None,
        )?
        .with_quota_project(agent.project_id.clone());
        Ok(Self::with_sessions(agent, sessions))
    }
}

impl<S: SessionsClient> ChatClient<S> {
    /// Creates a client for `agent` that sends turns through `sessions`.
    pub fn with_sessions(agent: AgentPath, sessions: S) -> Self {
        Self { agent, sessions }
    }

    /// The agent this client talks to.
    pub fn agent(&self) -> &AgentPath {
        &self.agent
    }

    /// The underlying sessions client.
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Returns the resource name of `session_id` under this client's agent.
    pub fn session_path(&self, session_id: &str) -> String {
        self.agent.session_path(session_id)
    }

    /// Sends one turn and returns the full response.
    ///
    /// # Errors
    ///
    /// Returns a validation error without contacting the service if
    /// `user_text` is blank, and the service's error otherwise.
    pub async fn detect_intent(
        &self,
        session_id: &str,
        user_text: &str,
        language_code: &str,
    ) -> Result<DetectIntentResponse> {
        if user_text.trim().is_empty() {
            return Err(Error::validation(
                "user text must not be empty",
                Some("user_text".to_string()),
            ));
        }
        let request = DetectIntentRequest::new(
            self.session_path(session_id),
            QueryInput::text(user_text, language_code),
        );
        self.sessions.detect_intent(&request).await
    }

    /// Sends `user_text` in English and returns the agent's reply text.
    pub async fn send_text(&self, session_id: &str, user_text: &str) -> Result<String> {
        self.send_text_with_language(session_id, user_text, DEFAULT_LANGUAGE_CODE)
            .await
    }

    /// Sends `user_text` and returns the agent's reply text.
    ///
    /// The reply is every text fragment of the response joined with spaces; it
    /// is empty when the agent answered without text.  Failures are logged
    /// here and returned unchanged; nothing is retried.
    pub async fn send_text_with_language(
        &self,
        session_id: &str,
        user_text: &str,
        language_code: &str,
    ) -> Result<String> {
        CHAT_TURNS.click();
        match self.detect_intent(session_id, user_text, language_code).await {
            Ok(response) => {
                let reply = extract_reply_text(&response);
                tracing::debug!(
                    session_id,
                    user_input = user_text,
                    bot_response = %reply,
                    intent = response.query_result.intent_display_name(),
                    "detectIntent succeeded"
                );
                if reply.is_empty() {
                    CHAT_EMPTY_REPLIES.click();
                    tracing::info!(session_id, "agent returned no text");
                }
                Ok(reply)
            }
            Err(err) => {
                CHAT_FAILED_TURNS.click();
                tracing::error!(session_id, error = %err, "error during detectIntent");
                Err(err)
            }
        }
    }

    /// Runs one turn in `context`, recording the outcome.
    pub async fn turn(&self, context: &SessionContext, user_text: &str) -> ConversationTurn {
        let bot_text = self
            .send_text_with_language(&context.session_id, user_text, &context.language_code)
            .await
            .ok();
        ConversationTurn {
            session_id: context.session_id.clone(),
            user_text: user_text.to_string(),
            bot_text,
        }
    }
}
