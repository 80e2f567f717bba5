use axum::http::Uri;
use axum::response::Response;
use axum::{extract::Request, middleware::Next};
use std::time::Instant;
use tracing::info;

/// Part of the request target that may be logged
///
/// The query string is left out: on the callback it carries the authorization
/// code and state.
pub fn loggable_target(uri: &Uri) -> &str {
    uri.path()
}

/// Logs method, path, status and elapsed time of every request
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let path = loggable_target(&parts.uri).to_string();
    info!("request method={} path={path}", parts.method);
    let begin = Instant::now();
    let response = next.run(Request::from_parts(parts, body)).await;
    let elapsed = begin.elapsed();
    info!(
        "response status={} path={path} elapsed_ms={}",
        response.status(),
        elapsed.as_millis()
    );
    response
}
