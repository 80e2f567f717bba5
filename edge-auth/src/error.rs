use http::StatusCode;
use thiserror::Error;

/// Failure of the authorization code exchange
///
/// The gate treats every variant the same way (clear the PKCE cookies and
/// redirect to `/`); the variants only exist for logging.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("token response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure to render an outcome into an HTTP message
#[derive(Error, Debug)]
pub enum GateError {
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    #[error("failed to build response: {0}")]
    Http(#[from] http::Error),
}
