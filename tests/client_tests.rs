//! Tests of the HTTP client against a local server with canned responses.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use cxchat::chat::ChatClient;
use cxchat::{
    AgentPath, Credentials, DetectIntentRequest, DialogflowCx, Error, QueryInput, SessionsClient,
};

const SESSION: &str = "projects/pizza-delivery/locations/global/agents/agent-1/sessions/user-1234";

/// A request as seen by the server: head (request line and headers) and body.
struct Captured {
    head: String,
    body: String,
}

/// Serves exactly one request with `status` and `body`, returning the base URL
/// and a receiver for what the client sent.
async fn serve_once(
    status: &'static str,
    extra_headers: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let (head_len, content_length) = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .map(|v| v.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                break (pos + 4, content_length);
            }
        };
        while buf.len() < head_len + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        let _ = tx.send(Captured {
            head: String::from_utf8_lossy(&buf[..head_len]).to_string(),
            body: String::from_utf8_lossy(&buf[head_len..]).to_string(),
        });
    });

    (format!("http://{addr}/"), rx)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn client(base_url: String) -> DialogflowCx {
    DialogflowCx::with_options(
        "global",
        Some(base_url),
        Some(Duration::from_secs(5)),
        Some(Credentials::AccessToken("ya29.test-token".to_string())),
    )
    .unwrap()
    .with_quota_project("pizza-delivery")
}

fn request(text: &str) -> DetectIntentRequest {
    DetectIntentRequest::new(SESSION, QueryInput::text(text, "en"))
}

#[tokio::test]
async fn detect_intent_round_trip() {
    let (base_url, captured) = serve_once(
        "200 OK",
        "",
        r#"{"responseId":"r-1","queryResult":{"text":"hi","languageCode":"en","responseMessages":[{"text":{"text":["Hello"]}},{"text":{"text":["there!"]}}]}}"#,
    )
    .await;

    let response = client(base_url).detect_intent(&request("hi")).await.unwrap();
    assert_eq!(response.response_id, "r-1");
    assert_eq!(response.text_fragments().collect::<Vec<_>>(), ["Hello", "there!"]);

    let captured = captured.await.unwrap();
    let request_line = captured.head.lines().next().unwrap();
    assert_eq!(
        request_line,
        format!("POST /v3/{SESSION}:detectIntent HTTP/1.1")
    );
    let head = captured.head.to_lowercase();
    assert!(head.contains("authorization: bearer ya29.test-token"));
    assert!(head.contains("x-goog-user-project: pizza-delivery"));

    let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"queryInput": {"text": {"text": "hi"}, "languageCode": "en"}})
    );
}

#[tokio::test]
async fn chat_client_over_http() {
    let (base_url, _captured) = serve_once(
        "200 OK",
        "",
        r#"{"queryResult":{"responseMessages":[{"payload":{"a":1}},{"text":{"text":["Hi! How can I help?"]}}]}}"#,
    )
    .await;

    let client = ChatClient::with_sessions(
        AgentPath::new("pizza-delivery", "global", "agent-1"),
        client(base_url),
    );
    let reply = client.send_text("user-1234", "hi").await.unwrap();
    assert_eq!(reply, "Hi! How can I help?");
}

#[tokio::test]
async fn not_found_is_mapped() {
    let (base_url, _captured) = serve_once(
        "404 Not Found",
        "",
        r#"{"error":{"code":404,"message":"Agent 'agent-1' does not exist.","status":"NOT_FOUND"}}"#,
    )
    .await;

    let err = client(base_url)
        .detect_intent(&request("hi"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Agent 'agent-1' does not exist."));
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let (base_url, _captured) = serve_once(
        "429 Too Many Requests",
        "Retry-After: 7\r\n",
        r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
    )
    .await;

    let err = client(base_url)
        .detect_intent(&request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimit {
            retry_after: Some(7),
            ..
        }
    ));
}

#[tokio::test]
async fn unmapped_status_keeps_google_status() {
    let (base_url, _captured) = serve_once(
        "409 Conflict",
        "",
        r#"{"error":{"code":409,"message":"Session is busy","status":"ABORTED"}}"#,
    )
    .await;

    let err = client(base_url)
        .detect_intent(&request("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(409));
    assert_eq!(err.to_string(), "ABORTED (409): Session is busy");
}

#[tokio::test]
async fn non_json_error_body_is_used_as_message() {
    let (base_url, _captured) = serve_once("503 Service Unavailable", "", "upstream down").await;

    let err = client(base_url)
        .detect_intent(&request("hi"))
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert!(err.to_string().contains("upstream down"));
}

#[tokio::test]
async fn malformed_success_body_is_serialization_error() {
    let (base_url, _captured) = serve_once("200 OK", "", "not json").await;

    let err = client(base_url)
        .detect_intent(&request("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Serialization { .. }));
}

#[tokio::test]
async fn refused_connection_is_remote_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/"))
        .detect_intent(&request("hi"))
        .await
        .unwrap_err();
    assert!(err.is_remote_call_failure());
    assert!(err.is_connection() || matches!(err, Error::HttpClient { .. }));
}

#[tokio::test]
async fn session_id_is_encoded_into_one_path_segment() {
    let agent = AgentPath::new("pizza-delivery", "global", "agent-1");
    for (session_id, encoded) in [
        ("a?b", "a%3Fb"),
        ("user#1", "user%231"),
        ("../../../../x", "..%2F..%2F..%2F..%2Fx"),
    ] {
        let (base_url, captured) = serve_once(
            "200 OK",
            "",
            r#"{"queryResult":{"responseMessages":[{"text":{"text":["ok"]}}]}}"#,
        )
        .await;
        let client = ChatClient::with_sessions(agent.clone(), client(base_url));
        assert_eq!(client.send_text(session_id, "hi").await.unwrap(), "ok");

        let captured = captured.await.unwrap();
        let request_line = captured.head.lines().next().unwrap().to_string();
        assert_eq!(
            request_line,
            format!("POST /v3/{agent}/sessions/{encoded}:detectIntent HTTP/1.1"),
            "session id {session_id:?}"
        );
    }
}
