use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::matrix::{dispatch::RequestDispatcher, error::MatrixError};

/// Where to send requests and how to authenticate them.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub homeserver_url: Url,
    pub access_token: String,
}

impl ClientConfig {
    pub fn new(homeserver_url: &str, access_token: impl Into<String>) -> Result<Self, MatrixError> {
        let homeserver_url = Url::parse(homeserver_url)
            .map_err(|e| MatrixError::InvalidConfig(format!("homeserver url {homeserver_url:?}: {e}")))?;
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(MatrixError::InvalidConfig("access token is empty".into()));
        }
        Ok(Self { homeserver_url, access_token })
    }

    /// Read `QUILL_HS` (default `http://localhost:8448`) and `QUILL_TOKEN`.
    pub fn from_env() -> Result<Self, MatrixError> {
        let homeserver = std::env::var("QUILL_HS")
            .unwrap_or_else(|_| "http://localhost:8448".into());
        let token = std::env::var("QUILL_TOKEN")
            .map_err(|_| MatrixError::InvalidConfig("QUILL_TOKEN is not set".into()))?;
        Self::new(&homeserver, token)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.homeserver_url.as_str().trim_end_matches('/'))
    }
}

/// [`RequestDispatcher`] over HTTPS with a bearer access token.
///
/// One request per call. No retries, no rate-limit handling.
#[derive(Clone, Debug)]
pub struct HttpDispatcher {
    config: ClientConfig,
    http: reqwest::Client,
}

impl HttpDispatcher {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxy, TLS roots).
    pub fn with_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn homeserver(&self) -> &Url {
        &self.config.homeserver_url
    }
}

#[async_trait]
impl RequestDispatcher for HttpDispatcher {
    async fn do_request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<Value>,
    ) -> Result<Value, MatrixError> {
        debug!("{method} {path}");

        let mut req = self
            .http
            .request(method.clone(), self.config.endpoint(path))
            .bearer_auth(&self.config.access_token);
        if let Some(query) = query {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!("{method} {path} failed: {e}");
            e
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let err = error_from_body(status, &bytes);
            warn!("{method} {path}: {err}");
            return Err(err);
        }

        if bytes.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Deserialize)]
struct StandardError {
    #[serde(default)]
    errcode: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Map a non-2xx response onto [`MatrixError::Status`], using the standard
/// `{errcode, error}` body when the homeserver sent one.
fn error_from_body(status: StatusCode, bytes: &[u8]) -> MatrixError {
    let parsed = serde_json::from_slice::<StandardError>(bytes).ok();
    let (errcode, error) = parsed.map(|e| (e.errcode, e.error)).unwrap_or_default();

    MatrixError::Status {
        status,
        errcode: errcode.unwrap_or_else(|| "M_UNKNOWN".into()),
        error: error.unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;

    /// Accept one connection on a loopback port, answer it with `status` and
    /// `body`, and hand back the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= end + 4 + body_len
    }

    fn dispatcher(url: &str) -> HttpDispatcher {
        let config = ClientConfig::new(url, "secret").unwrap();
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpDispatcher::with_client(config, http)
    }

    #[tokio::test]
    async fn sends_bearer_token_and_query() {
        let (url, server) = serve_once("200 OK", r#"{"chunk":[]}"#).await;
        let query = [("from".to_owned(), "t1".to_owned()), ("limit".to_owned(), "10".to_owned())];

        let response = dispatcher(&url)
            .do_request(Method::GET, "/_matrix/client/r0/rooms/x/messages", Some(&query[..]), None)
            .await
            .unwrap();
        assert_eq!(response, json!({ "chunk": [] }));

        let request = server.await.unwrap();
        assert!(
            request.starts_with("GET /_matrix/client/r0/rooms/x/messages?from=t1&limit=10 HTTP/1.1\r\n"),
            "{request}"
        );
        assert!(request.to_ascii_lowercase().contains("\r\nauthorization: bearer secret\r\n"));
    }

    #[tokio::test]
    async fn sends_json_body() {
        let (url, server) = serve_once("200 OK", r#"{"group_id":"+foo:example.org"}"#).await;

        let response = dispatcher(&url)
            .do_request(
                Method::POST,
                "/_matrix/client/r0/create_group",
                None,
                Some(json!({ "localpart": "foo" })),
            )
            .await
            .unwrap();
        assert_eq!(response["group_id"], "+foo:example.org");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /_matrix/client/r0/create_group HTTP/1.1\r\n"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"localpart":"foo"}"#));
    }

    #[tokio::test]
    async fn empty_success_body_reads_as_empty_object() {
        let (url, server) = serve_once("200 OK", "").await;

        let response = dispatcher(&url)
            .do_request(Method::PUT, "/_matrix/client/r0/groups/+g:example.org/profile", None, None)
            .await
            .unwrap();
        assert_eq!(response, json!({}));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn error_status_becomes_status_error() {
        let (url, server) = serve_once(
            "403 Forbidden",
            r#"{"errcode":"M_FORBIDDEN","error":"not an admin"}"#,
        )
        .await;

        let err = dispatcher(&url)
            .do_request(Method::PUT, "/_matrix/client/r0/groups/+g:example.org/settings/m.join_policy", None, Some(json!({})))
            .await
            .unwrap_err();
        match err {
            MatrixError::Status { status, errcode, error } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(errcode, "M_FORBIDDEN");
                assert_eq!(error, "not an admin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[test]
    fn parses_standard_error_body() {
        let err = error_from_body(
            StatusCode::FORBIDDEN,
            br#"{"errcode":"M_FORBIDDEN","error":"You are not invited to this room."}"#,
        );
        match err {
            MatrixError::Status { status, errcode, error } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(errcode, "M_FORBIDDEN");
                assert_eq!(error, "You are not invited to this room.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_falls_back() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, b"<html>upstream down</html>");
        assert_eq!(err.errcode(), Some("M_UNKNOWN"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn config_joins_paths_without_double_slash() {
        let config = ClientConfig::new("https://matrix.example.org/", "secret").unwrap();
        assert_eq!(
            config.endpoint("/_matrix/client/r0/create_group"),
            "https://matrix.example.org/_matrix/client/r0/create_group"
        );
    }

    #[test]
    fn config_rejects_bad_input() {
        assert!(matches!(
            ClientConfig::new("not a url", "secret"),
            Err(MatrixError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClientConfig::new("http://localhost:8448", ""),
            Err(MatrixError::InvalidConfig(_))
        ));
    }
}
