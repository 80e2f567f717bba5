//! axum front end: buffers the request, runs the gate, answers or forwards

use crate::error::ProxyError;
use crate::forward::OriginForwarder;
use crate::observability::observability_middleware;
use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware;
use axum::response::Response;
use edge_auth::gate::RequestGate;
use edge_auth::response::Rendered;
use http::HeaderValue;
use http::header::HOST;
use http::request::Parts;
use std::sync::Arc;

pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<RequestGate>,
    pub forwarder: Arc<OriginForwarder>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(gate: RequestGate, forwarder: OriginForwarder) -> Self {
        Self {
            gate: Arc::new(gate),
            forwarder: Arc::new(forwarder),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

pub async fn gate_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (mut parts, body) = request.into_parts();
    ensure_host(&mut parts)?;
    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|_| ProxyError::BodyTooLarge {
            limit: state.max_body_bytes,
        })?;

    let outcome = state
        .gate
        .handle(edge_auth::request::Request::from_parts(parts))
        .await;
    match outcome.render()? {
        Rendered::Respond(response) => Ok(response.map(Body::from)),
        Rendered::Forward(request) => state.forwarder.forward(request, body).await,
    }
}

/// Makes sure the gate sees a `Host` header
///
/// HTTP/2 clients send `:authority`, which lands in the URI rather than in the
/// headers. A request with neither is rejected.
pub fn ensure_host(parts: &mut Parts) -> Result<(), ProxyError> {
    let has_host = parts
        .headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| !h.trim().is_empty());
    if has_host {
        return Ok(());
    }

    let authority = parts.uri.authority().ok_or(ProxyError::MissingHost)?;
    let host = match authority.port_u16() {
        Some(port) => format!("{}:{port}", authority.host()),
        None => authority.host().to_string(),
    };
    if host.is_empty() {
        return Err(ProxyError::MissingHost);
    }
    let value = HeaderValue::from_str(&host).map_err(|_| ProxyError::MissingHost)?;
    parts.headers.insert(HOST, value);
    Ok(())
}

/// Every path and method goes through the gate
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(gate_handler)
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}
