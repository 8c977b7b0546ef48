use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

/// HTTP header carrying the session identifier
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Identifies one browsing session's selection and favorites
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reads the session id from request headers, if present and well-formed
    pub fn from_request<B>(request: &Request<B>) -> Option<Self> {
        request
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(SessionId)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves the caller's session and exposes it to handlers as an extension.
///
/// A missing or malformed `x-session-id` starts a new session. The id in use is
/// always echoed back on the response so clients can keep sending it.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let session_id = SessionId::from_request(&request).unwrap_or_else(|| {
        let id = SessionId::new();
        tracing::debug!(session_id = %id, "Starting new session");
        id
    });

    request.extensions_mut().insert(session_id);

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&session_id.to_string()) {
        response.headers_mut().insert(SESSION_ID_HEADER, header_value);
    }

    response
}

/// Tracing span for a request, tagged with the session id when the client sent one
pub fn make_span_with_session(request: &Request<Body>) -> tracing::Span {
    let session_id = SessionId::from_request(request)
        .map(|id| id.to_string())
        .unwrap_or_else(|| "new".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        session_id = %session_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(id): Extension<SessionId>| async move { id.to_string() }),
            )
            .layer(axum::middleware::from_fn(session_middleware))
    }

    #[tokio::test]
    async fn test_existing_session_id_is_kept() {
        let id = Uuid::new_v4();
        let request = http::Request::builder()
            .uri("/")
            .header(SESSION_ID_HEADER, id.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(SESSION_ID_HEADER).unwrap(),
            id.to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_invalid_session_id_is_replaced() {
        let request = http::Request::builder()
            .uri("/")
            .header(SESSION_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let echoed = response
            .headers()
            .get(SESSION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(echoed).is_ok());
    }

    #[test]
    fn test_from_request_without_header() {
        let request = http::Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(SessionId::from_request(&request), None);
    }
}
