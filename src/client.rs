use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::credentials::{Credentials, TokenSource};
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::sessions::SessionsClient;
use crate::types::{DetectIntentRequest, DetectIntentResponse};

const DEFAULT_API_URL: &str = "https://dialogflow.googleapis.com/";
const API_VERSION: &str = "v3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DETECT_INTENT_METHOD: &str = ":detectIntent";
/// `projects/{p}/locations/{l}/agents/{a}/sessions/{id}`
const SESSION_PATH_SEGMENTS: usize = 8;

/// Returns the API endpoint serving agents in `location`.
///
/// Agents in `global` are served from the global endpoint; every other
/// location has a regional endpoint.
pub fn endpoint_for_location(location: &str) -> String {
    if location.is_empty() || location == "global" {
        DEFAULT_API_URL.to_string()
    } else {
        format!("https://{location}-dialogflow.googleapis.com/")
    }
}

/// Client for the Dialogflow CX sessions API.
#[derive(Debug, Clone)]
pub struct DialogflowCx {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
    tokens: TokenSource,
    quota_project: Option<String>,
}

impl DialogflowCx {
    /// Create a new client for agents in `location`.
    ///
    /// Access tokens are discovered from the environment, see [`Credentials::from_env`].
    pub fn new(location: &str) -> Result<Self> {
        Self::with_options(location, None, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        location: &str,
        base_url: Option<String>,
        timeout: Option<Duration>,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| endpoint_for_location(location));
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            tokens: TokenSource::new(credentials.unwrap_or_else(Credentials::from_env)),
            quota_project: None,
        })
    }

    /// Bill requests to `project` via the `x-goog-user-project` header.
    pub fn with_quota_project(mut self, project: impl Into<String>) -> Self {
        self.quota_project = Some(project.into());
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Builds the detectIntent URL for a session resource name.
    ///
    /// Each segment of the name is percent-encoded on its own, and the session
    /// id may contain any characters, including `/`.  Parent segments that are
    /// empty or dot segments are rejected since they cannot name a resource.
    fn detect_intent_url(&self, session: &str) -> Result<Url> {
        let mut segments: Vec<&str> = session.splitn(SESSION_PATH_SEGMENTS, '/').collect();
        let session_id = segments.pop().unwrap_or_default();
        if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
            return Err(Error::validation(
                format!("invalid session resource name: {session:?}"),
                Some("session".to_string()),
            ));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::url(format!("{} cannot be a base URL", self.base_url), None))?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(&segments)
            .push(&format!("{session_id}{DETECT_INTENT_METHOD}"));
        Ok(url)
    }

    /// Create and return default headers for API requests.
    async fn default_headers(&self) -> Result<HeaderMap> {
        let token = self.tokens.token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::authentication("access token is not a valid header value"))?,
        );
        if let Some(project) = &self.quota_project {
            headers.insert(
                "x-goog-user-project",
                HeaderValue::from_str(project).map_err(|_| {
                    Error::validation(
                        "project id is not a valid header value",
                        Some("project_id".to_string()),
                    )
                })?,
            );
        }
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Google APIs wrap errors as {"error": {"code", "message", "status"}}
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let status = detail.as_ref().and_then(|d| d.status.clone());
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| error_body.trim().to_string());

        match status_code {
            400 => Error::bad_request(message),
            401 => Error::authentication(message),
            403 => Error::permission(message),
            404 => Error::not_found(message),
            408 => Error::timeout(message, None),
            429 => Error::rate_limit(message, retry_after),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message, retry_after),
            _ => Error::api(status_code, status, message),
        }
    }

    async fn send(&self, request: &DetectIntentRequest) -> Result<DetectIntentResponse> {
        let url = self.detect_intent_url(&request.session)?;
        tracing::debug!(url = %url, "sending detectIntent");

        let response = self
            .client
            .post(url)
            .headers(self.default_headers().await?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<DetectIntentResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl SessionsClient for DialogflowCx {
    async fn detect_intent(&self, request: &DetectIntentRequest) -> Result<DetectIntentResponse> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.send(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            CLIENT_REQUEST_ERRORS.click();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let token = Some(Credentials::AccessToken("test-token".to_string()));
        let client = DialogflowCx::with_options("global", None, None, token.clone()).unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
        assert!(client.quota_project.is_none());

        let client = DialogflowCx::with_options(
            "global",
            Some("http://127.0.0.1:8080".to_string()),
            Some(Duration::from_secs(5)),
            token,
        )
        .unwrap()
        .with_quota_project("pizza-delivery");
        assert_eq!(client.base_url(), "http://127.0.0.1:8080/");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.quota_project.as_deref(), Some("pizza-delivery"));
    }

    #[test]
    fn regional_endpoints() {
        assert_eq!(endpoint_for_location("global"), DEFAULT_API_URL);
        assert_eq!(endpoint_for_location(""), DEFAULT_API_URL);
        assert_eq!(
            endpoint_for_location("us-central1"),
            "https://us-central1-dialogflow.googleapis.com/"
        );

        let client = DialogflowCx::with_options(
            "europe-west1",
            None,
            None,
            Some(Credentials::AccessToken("t".to_string())),
        )
        .unwrap();
        assert_eq!(
            client.base_url(),
            "https://europe-west1-dialogflow.googleapis.com/"
        );
    }

    #[test]
    fn invalid_base_url() {
        let err = DialogflowCx::with_options(
            "global",
            Some("not a url".to_string()),
            None,
            Some(Credentials::AccessToken("t".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn detect_intent_url_encodes_session_id() {
        let client = DialogflowCx::with_options(
            "global",
            Some("http://127.0.0.1:8080/api".to_string()),
            None,
            Some(Credentials::AccessToken("t".to_string())),
        )
        .unwrap();
        let agent = "projects/p/locations/global/agents/a";
        let url = |id: &str| {
            client
                .detect_intent_url(&format!("{agent}/sessions/{id}"))
                .unwrap()
                .to_string()
        };
        let base = format!("http://127.0.0.1:8080/api/v3/{agent}/sessions");

        assert_eq!(url("user-1234"), format!("{base}/user-1234:detectIntent"));
        assert_eq!(url("a?b"), format!("{base}/a%3Fb:detectIntent"));
        assert_eq!(url("user#1"), format!("{base}/user%231:detectIntent"));
        assert_eq!(url("../../x"), format!("{base}/..%2F..%2Fx:detectIntent"));
        assert_eq!(url(".."), format!("{base}/..:detectIntent"));
    }

    #[test]
    fn detect_intent_url_rejects_dot_parents() {
        let client = DialogflowCx::with_options(
            "global",
            None,
            None,
            Some(Credentials::AccessToken("t".to_string())),
        )
        .unwrap();
        let err = client
            .detect_intent_url("projects/../locations/global/agents/a/sessions/s")
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn default_headers_carry_token_and_project() {
        let client = DialogflowCx::with_options(
            "global",
            None,
            None,
            Some(Credentials::AccessToken("ya29.test".to_string())),
        )
        .unwrap()
        .with_quota_project("pizza-delivery");
        let headers = client.default_headers().await.unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer ya29.test");
        assert_eq!(headers["x-goog-user-project"], "pizza-delivery");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    }
}
