//! Configuration types for the chat application.
//!
//! Settings are gathered in layers: an optional YAML file, then `DIALOGFLOW_*`
//! environment variables, then command-line flags parsed by `arrrg`.  Later
//! layers win.  The resolved [`ChatConfig`] must name a project and an agent.

use std::env;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utf8path::Path;

use crate::error::{Error, Result};
use crate::types::AgentPath;

/// Default agent location.
pub const DEFAULT_LOCATION: &str = "global";

/// Default language of user input.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Command-line arguments for the cxchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// YAML file to read settings from.
    #[arrrg(optional, "YAML configuration file", "FILE")]
    pub config: Option<String>,

    /// Google Cloud project id.
    #[arrrg(optional, "Google Cloud project id", "PROJECT")]
    pub project_id: Option<String>,

    /// Agent location.
    #[arrrg(optional, "Agent location (default: global)", "LOCATION")]
    pub location: Option<String>,

    /// Agent id.
    #[arrrg(optional, "Dialogflow CX agent id", "AGENT")]
    pub agent_id: Option<String>,

    /// Session id.
    #[arrrg(optional, "Session id (default: cli-<timestamp>)", "SESSION")]
    pub session_id: Option<String>,

    /// Language of user input.
    #[arrrg(optional, "Language code (default: en)", "CODE")]
    pub language_code: Option<String>,

    /// Base URL of the API.
    #[arrrg(optional, "API base URL (default: derived from location)", "URL")]
    pub endpoint: Option<String>,

    /// Request timeout.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Log at info level instead of warn.
    #[arrrg(flag, "Verbose logging")]
    pub verbose: bool,
}

/// One layer of optional settings.
///
/// The same shape is read from the YAML file, the environment, and the
/// command line, then merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    /// Google Cloud project id.
    pub project_id: Option<String>,
    /// Agent location.
    pub location: Option<String>,
    /// Agent id.
    pub agent_id: Option<String>,
    /// Session id.
    pub session_id: Option<String>,
    /// Language of user input.
    pub language_code: Option<String>,
    /// Base URL of the API.
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ConfigLayer {
    /// Reads a layer from a YAML file.
    pub fn from_file(path: &Path<'_>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_str())
            .map_err(|e| Error::io(format!("cannot read {}: {e}", path.as_str()), e))?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Reads a layer from the `DIALOGFLOW_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads a layer through `lookup`, which maps variable names to values.
    ///
    /// Empty values are treated as unset.  An unparseable timeout is ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        Self {
            project_id: get("DIALOGFLOW_PROJECT_ID"),
            location: get("DIALOGFLOW_LOCATION"),
            agent_id: get("DIALOGFLOW_AGENT_ID"),
            session_id: get("DIALOGFLOW_SESSION_ID"),
            language_code: get("DIALOGFLOW_LANGUAGE_CODE"),
            endpoint: get("DIALOGFLOW_ENDPOINT"),
            timeout_secs: get("DIALOGFLOW_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Returns this layer with every setting present in `higher` replaced by it.
    pub fn overlay(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            project_id: higher.project_id.or(self.project_id),
            location: higher.location.or(self.location),
            agent_id: higher.agent_id.or(self.agent_id),
            session_id: higher.session_id.or(self.session_id),
            language_code: higher.language_code.or(self.language_code),
            endpoint: higher.endpoint.or(self.endpoint),
            timeout_secs: higher.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl From<&ChatArgs> for ConfigLayer {
    fn from(args: &ChatArgs) -> Self {
        Self {
            project_id: args.project_id.clone(),
            location: args.location.clone(),
            agent_id: args.agent_id.clone(),
            session_id: args.session_id.clone(),
            language_code: args.language_code.clone(),
            endpoint: args.endpoint.clone(),
            timeout_secs: args.timeout_secs,
        }
    }
}

/// Returns a session id unique to this process start: `cli-<unix seconds>`.
pub fn default_session_id() -> String {
    format!("cli-{}", OffsetDateTime::now_utc().unix_timestamp())
}

/// Configuration for a chat run.
///
/// This struct holds the resolved configuration values after merging the
/// configuration layers with defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The agent to talk to.
    pub agent: AgentPath,

    /// Session the conversation starts in.
    pub session_id: String,

    /// Language of user input.
    pub language_code: String,

    /// Base URL override; `None` derives it from the location.
    pub endpoint: Option<String>,

    /// Request timeout override.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log at info level.
    pub verbose: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig for `agent` with default values.
    ///
    /// Defaults:
    /// - Session: `cli-<unix seconds>`
    /// - Language: en
    /// - Endpoint: derived from the agent location
    /// - Color: enabled
    pub fn new(agent: AgentPath) -> Self {
        Self {
            agent,
            session_id: default_session_id(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            endpoint: None,
            timeout: None,
            use_color: true,
            verbose: false,
        }
    }

    /// Resolves a layer into a configuration, failing if project or agent is missing.
    pub fn from_layer(layer: ConfigLayer) -> Result<Self> {
        let project_id = required(layer.project_id, "project_id", "DIALOGFLOW_PROJECT_ID")?;
        let agent_id = required(layer.agent_id, "agent_id", "DIALOGFLOW_AGENT_ID")?;
        let location = layer
            .location
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let mut config = ChatConfig::new(AgentPath::new(project_id, location, agent_id));
        if let Some(session_id) = layer.session_id {
            config.session_id = session_id;
        }
        if let Some(language_code) = layer.language_code {
            config.language_code = language_code;
        }
        config.endpoint = layer.endpoint;
        config.timeout = layer.timeout_secs.map(Duration::from_secs);
        Ok(config)
    }

    /// Resolves command-line arguments against the configuration file and environment.
    pub fn load(args: &ChatArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => ConfigLayer::from_file(&Path::from(path.as_str()))?,
            None => ConfigLayer::default(),
        };
        let layer = file
            .overlay(ConfigLayer::from_env())
            .overlay(ConfigLayer::from(args));

        let mut config = Self::from_layer(layer)?;
        config.use_color = !args.no_color;
        config.verbose = args.verbose;
        Ok(config)
    }

    /// Sets the session id.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Sets the language code.
    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

fn required(value: Option<String>, param: &str, var: &str) -> Result<String> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        Error::validation(
            format!(
                "{param} is required (--{} or {var})",
                param.replace('_', "-")
            ),
            Some(param.to_string()),
        )
    })
}
