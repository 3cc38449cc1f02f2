use std::fmt;

use serde::{Deserialize, Serialize};

/// The coordinates of a Dialogflow CX agent.
///
/// An agent is addressed by the project that owns it, the location it is
/// deployed in (e.g. `global` or `us-central1`), and its id.  None of the
/// fields are validated; a malformed value surfaces when the service is called.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentPath {
    /// Google Cloud project id.
    pub project_id: String,

    /// Location of the agent.
    pub location: String,

    /// Agent id.
    pub agent_id: String,
}

impl AgentPath {
    /// Creates a new agent path from its three identifiers.
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            agent_id: agent_id.into(),
        }
    }

    /// Returns the resource name of a session of this agent:
    /// `projects/{project}/locations/{location}/agents/{agent}/sessions/{session}`.
    pub fn session_path(&self, session_id: &str) -> String {
        format!("{self}/sessions/{session_id}")
    }
}

impl fmt::Display for AgentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/agents/{}",
            self.project_id, self.location, self.agent_id
        )
    }
}
