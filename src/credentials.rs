//! Ambient credential discovery for the Dialogflow API.
//!
//! A ready-made token in the environment wins.  Otherwise tokens come from
//! Google Application Default Credentials via `gcp_auth`: a service-account key
//! named by `GOOGLE_APPLICATION_CREDENTIALS`, the application-default login,
//! the metadata server, and finally the `gcloud` CLI.  Nothing is resolved
//! until the first request needs a token, so constructing a client never fails
//! for lack of credentials.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::TokenProvider;
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};

use crate::error::{Error, Result};

/// Environment variables consulted for a ready-made access token, in order.
pub const ACCESS_TOKEN_ENV_VARS: &[&str] =
    &["DIALOGFLOW_ACCESS_TOKEN", "GOOGLE_OAUTH_ACCESS_TOKEN"];

/// OAuth scope requested from Application Default Credentials.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Command tokens are assumed to live for an hour; refresh well before that.
const COMMAND_TOKEN_TTL: Duration = Duration::from_secs(45 * 60);

/// Where access tokens come from.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A fixed bearer token.
    AccessToken(String),

    /// Google Application Default Credentials.
    ApplicationDefault,

    /// A command whose trimmed standard output is a bearer token.
    Command {
        /// Program to run.
        program: String,
        /// Arguments to pass.
        args: Vec<String>,
    },
}

impl Credentials {
    /// Uses the first non-empty token in [`ACCESS_TOKEN_ENV_VARS`], falling back to
    /// Application Default Credentials.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Like [`Credentials::from_env`], reading variables through `get`.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        ACCESS_TOKEN_ENV_VARS
            .iter()
            .filter_map(|&var| get(var))
            .map(|token| token.trim().to_string())
            .find(|token| !token.is_empty())
            .map(Credentials::AccessToken)
            .unwrap_or(Credentials::ApplicationDefault)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Credentials::ApplicationDefault => f.write_str("ApplicationDefault"),
            Credentials::Command { program, args } => f
                .debug_struct("Command")
                .field("program", program)
                .field("args", args)
                .finish(),
        }
    }
}

/// A cached source of bearer tokens.
#[derive(Clone)]
pub struct TokenSource {
    credentials: Credentials,
    cached: Arc<Mutex<Option<(String, Instant)>>>,
    provider: Arc<OnceCell<Arc<dyn TokenProvider>>>,
}

impl TokenSource {
    /// Creates a token source over the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cached: Arc::new(Mutex::new(None)),
            provider: Arc::new(OnceCell::new()),
        }
    }

    /// Returns the credentials this source draws from.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns a bearer token, refreshing it if the cached one is stale.
    pub async fn token(&self) -> Result<String> {
        match &self.credentials {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::ApplicationDefault => self.application_default_token().await,
            Credentials::Command { program, args } => self.command_token(program, args).await,
        }
    }

    async fn application_default_token(&self) -> Result<String> {
        let provider = self
            .provider
            .get_or_try_init(|| async {
                tracing::debug!("discovering application default credentials");
                gcp_auth::provider().await.map_err(|e| {
                    Error::authentication(format!(
                        "no access token in {} and no application default credentials: {e}",
                        ACCESS_TOKEN_ENV_VARS.join(" or ")
                    ))
                })
            })
            .await?;
        // gcp_auth caches the token and refreshes it before expiry.
        let token = provider
            .token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| Error::authentication(format!("failed to obtain access token: {e}")))?;
        Ok(token.as_str().to_string())
    }

    async fn command_token(&self, program: &str, args: &[String]) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some((token, fetched)) = cached.as_ref()
            && fetched.elapsed() < COMMAND_TOKEN_TTL
        {
            return Ok(token.clone());
        }

        tracing::debug!(program = %program, "fetching access token");
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::authentication(format!("`{program}` could not be run: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::authentication(format!(
                "`{program}` exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(Error::authentication(format!(
                "`{program}` printed an empty access token"
            )));
        }
        *cached = Some((token.clone(), Instant::now()));
        Ok(token)
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("credentials", &self.credentials)
            .finish()
    }
}
