//! HTTP server exposing an [`EntityService`] over the hierarchy API.
//!
//! Serves the same two endpoints the HTTP client consumes, so a fixture can
//! stand in for the real entity service during development and tests:
//!
//! - `GET /api/hierarchy` - `{"entities": [...]}` with every client
//! - `GET /api/hierarchy/:type/:id/context` - an [`EntityContext`](crate::models::EntityContext)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path as AxumPath, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::models::{EntityContext, EntityType};
use crate::service::EntityService;
use crate::{Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn EntityService>,
    /// Bearer token every request must carry, if any
    pub token: Option<String>,
}

impl AppState {
    pub fn new(service: Arc<dyn EntityService>, token: Option<String>) -> Self {
        Self {
            service,
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

/// Error body returned by every failing endpoint.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self.0 {
            Error::Validation(m)
            | Error::NotFound(m)
            | Error::Authentication(m)
            | Error::Server(m) => m,
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> std::result::Result<(), ApiError> {
    let Some(expected) = &state.token else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match presented {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(Error::Authentication("invalid token".to_string()).into()),
        None => Err(Error::Authentication("missing bearer token".to_string()).into()),
    }
}

/// Build the router. Exposed separately from [`start_server`] so tests can
/// bind an ephemeral port.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/hierarchy", get(get_roots))
        .route("/api/hierarchy/:entity_type/:id/context", get(get_context))
        .with_state(state)
}

async fn get_roots(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let entities = state.service.list_roots().await?;
    Ok(Json(json!({ "entities": entities })))
}

async fn get_context(
    State(state): State<AppState>,
    AxumPath((entity_type, id)): AxumPath<(String, String)>,
    headers: HeaderMap,
) -> std::result::Result<Json<EntityContext>, ApiError> {
    authorize(&state, &headers)?;
    let entity_type: EntityType = entity_type.parse()?;
    tracing::debug!(%entity_type, %id, "context requested");
    let context = state.service.fetch_context(entity_type, &id).await?;
    Ok(Json(context))
}

/// Serve `service` on `host:port` until the process is stopped.
pub async fn start_server(
    service: Arc<dyn EntityService>,
    host: &str,
    port: u16,
    token: Option<String>,
) -> Result<()> {
    let host_addr: std::net::IpAddr = host
        .parse()
        .map_err(|e| Error::Validation(format!("invalid host address '{}': {}", host, e)))?;
    let addr = SocketAddr::from((host_addr, port));
    let app = router(AppState::new(service, token));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "entity service listening");
    eprintln!("Serving hierarchy API at http://{}", addr);
    eprintln!("Press Ctrl+C to stop");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use crate::service::{Fixture, InMemoryEntityService};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(token: Option<&str>) -> Router {
        let service = InMemoryEntityService::from_fixture(Fixture {
            entities: vec![
                Entity::named(EntityType::Client, "C1", "Acme", None),
                Entity::named(EntityType::Program, "P1", "Retail", Some("C1")),
            ],
        })
        .unwrap();
        router(AppState::new(Arc::new(service), token.map(str::to_string)))
    }

    async fn get(app: Router, uri: &str, bearer: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_context_endpoint() {
        let (status, body) = get(app(None), "/api/hierarchy/program/P1/context", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entity"]["id"], "P1");
        assert_eq!(body["parent"]["id"], "C1");
    }

    #[tokio::test]
    async fn test_roots_endpoint() {
        let (status, body) = get(app(None), "/api/hierarchy", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entities"][0]["type"], "client");
    }

    #[tokio::test]
    async fn test_unknown_entity_is_404() {
        let (status, body) = get(app(None), "/api/hierarchy/program/P9/context", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_type_is_400() {
        let (status, _) = get(app(None), "/api/hierarchy/epic/E1/context", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_token_is_enforced() {
        let (status, _) = get(app(Some("s3cret")), "/api/hierarchy", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = get(app(Some("s3cret")), "/api/hierarchy", Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = get(app(Some("s3cret")), "/api/hierarchy", Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
