use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use edge_auth::error::GateError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("request carries no host")]
    MissingHost,

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("rendering gate response: {0}")]
    Render(#[from] GateError),

    #[error("origin unreachable: {0}")]
    Origin(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response<Body> {
        let status = match &self {
            ProxyError::MissingHost => StatusCode::BAD_REQUEST,
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Origin(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Render(_) | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("{self:?}");
        // details stay in the log
        let message = status.canonical_reason().unwrap_or("error").to_string();
        (status, message).into_response()
    }
}
