//! REST client for the entity service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::EntityService;
use crate::models::{Entity, EntityContext, EntityType};
use crate::{Error, Result};

/// Path under the API base URL where hierarchy resources live.
pub const CONTEXT_PATH_PREFIX: &str = "/api/hierarchy";

/// User-Agent sent with every request
const USER_AGENT: &str = concat!("trackwise/", env!("CARGO_PKG_VERSION"));

/// Longest error body excerpt carried into an error message
const MAX_ERROR_EXCERPT: usize = 200;

/// Response from the top-level listing endpoint
#[derive(Debug, Deserialize)]
struct RootsResponse {
    entities: Vec<Entity>,
}

/// Entity service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEntityService {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpEntityService {
    /// Create a client for the API at `base_url`.
    ///
    /// Every request is bounded by `timeout`; expiry surfaces as a network error.
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid api-url '{}': {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "api-url must be an http(s) URL, got '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the context resource for `(entity_type, id)`.
    pub fn context_url(&self, entity_type: EntityType, id: &str) -> Url {
        self.hierarchy_url(&[entity_type.as_str(), id, "context"])
    }

    /// URL of the top-level listing.
    pub fn roots_url(&self) -> Url {
        self.hierarchy_url(&[])
    }

    fn hierarchy_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(CONTEXT_PATH_PREFIX.trim_start_matches('/').split('/'));
            path.extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, subject: &str) -> Result<T> {
        tracing::debug!(%url, "GET");
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, subject));
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Server(format!("malformed response for {}: {}", subject, e)))
    }
}

#[async_trait]
impl EntityService for HttpEntityService {
    async fn fetch_context(&self, entity_type: EntityType, id: &str) -> Result<EntityContext> {
        let subject = format!("{} {}", entity_type, id);
        self.get_json(self.context_url(entity_type, id), &subject)
            .await
    }

    async fn list_roots(&self) -> Result<Vec<Entity>> {
        let response: RootsResponse = self.get_json(self.roots_url(), "top level").await?;
        Ok(response.entities)
    }
}

/// Map a non-success HTTP status to the error taxonomy.
pub(crate) fn map_status(status: StatusCode, body: &str, subject: &str) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(subject.to_string()),
        StatusCode::UNAUTHORIZED => Error::Authentication(
            extract_message(body).unwrap_or_else(|| "session expired".to_string()),
        ),
        _ => {
            let detail = extract_message(body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
            Error::Server(format!("{} ({})", detail, status.as_u16()))
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Prefers an `error` or `message` string field in a JSON object, then the raw text.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = map.get(key).and_then(|v| v.as_str()) {
                return Some(msg.to_string());
            }
        }
    }
    Some(body.chars().take(MAX_ERROR_EXCERPT).collect())
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Network(format!("request timed out: {}", err))
    } else if err.is_decode() {
        Error::Server(format!("malformed response: {}", err))
    } else {
        Error::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(base: &str) -> HttpEntityService {
        HttpEntityService::new(base, Duration::from_secs(1), None).unwrap()
    }

    #[test]
    fn test_context_url_layout() {
        let svc = service("http://localhost:8080");
        assert_eq!(
            svc.context_url(EntityType::UseCase, "U1").as_str(),
            "http://localhost:8080/api/hierarchy/usecase/U1/context"
        );
    }

    #[test]
    fn test_context_url_keeps_base_path_and_escapes_id() {
        let svc = service("https://qa.example.com/tracker/");
        assert_eq!(
            svc.context_url(EntityType::Task, "T 1/x").as_str(),
            "https://qa.example.com/tracker/api/hierarchy/task/T%201%2Fx/context"
        );
        assert_eq!(
            svc.roots_url().as_str(),
            "https://qa.example.com/tracker/api/hierarchy"
        );
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = HttpEntityService::new("ftp://example.com", Duration::from_secs(1), None)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = HttpEntityService::new("not a url", Duration::from_secs(1), None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let svc =
            HttpEntityService::new("http://localhost", Duration::from_secs(1), Some("  ".into()))
                .unwrap();
        assert!(svc.token.is_none());
    }

    #[test]
    fn test_map_status_not_found() {
        let err = map_status(StatusCode::NOT_FOUND, "", "task T9");
        assert!(matches!(err, Error::NotFound(ref s) if s == "task T9"));
    }

    #[test]
    fn test_map_status_unauthorized() {
        let err = map_status(StatusCode::UNAUTHORIZED, r#"{"error":"token expired"}"#, "x");
        assert!(matches!(err, Error::Authentication(ref s) if s == "token expired"));
    }

    #[test]
    fn test_map_status_other_is_server_error_with_message() {
        let err = map_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"database unavailable"}"#,
            "x",
        );
        match err {
            Error::Server(msg) => {
                assert!(msg.contains("database unavailable"));
                assert!(msg.contains("500"));
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn test_map_status_empty_body_uses_reason() {
        let err = map_status(StatusCode::BAD_GATEWAY, "", "x");
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_extract_message_truncates_plain_text() {
        let body = "x".repeat(500);
        let msg = extract_message(&body).unwrap();
        assert_eq!(msg.len(), MAX_ERROR_EXCERPT);
    }
}
