//! Forwarding of admitted requests to the origin

use crate::config::HeaderForwardingConfig;
use crate::error::ProxyError;
use anyhow::{Context, Result};
use axum::body::Body;
use bytes::Bytes;
use edge_auth::request::Request;
use http::header::{HeaderName, HeaderValue};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Sends pass-through requests to a fixed origin base URL
#[derive(Debug, Clone)]
pub struct OriginForwarder {
    http_client: reqwest::Client,
    origin: Url,
    headers: HeaderForwardingConfig,
}

impl OriginForwarder {
    pub fn new(origin: Url, headers: HeaderForwardingConfig, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .context("building origin http client")?;
        Ok(Self {
            http_client,
            origin,
            headers,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Origin base URL joined with the request's path and query
    pub fn target_url(&self, path_and_query: &str) -> Result<Url> {
        let base = self.origin.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path_and_query}"))
            .with_context(|| format!("building origin url for {path_and_query}"))
    }

    pub async fn forward(
        &self,
        request: Request,
        body: Bytes,
    ) -> Result<http::Response<Body>, ProxyError> {
        let target = self.target_url(request.path_and_query())?;
        let mut headers = self.headers.filter(request.headers());
        if let Some(host) = request.host() {
            headers.insert(
                X_FORWARDED_HOST,
                HeaderValue::from_str(host).context("x-forwarded-host")?,
            );
        }
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));

        let (method, _, _) = request.into_parts();
        debug!("forwarding {method} {}", target.path());
        let response = self
            .http_client
            .request(method, target)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let response_headers = self.headers.filter(response.headers());
        let bytes = response
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)?;

        let mut forwarded = http::Response::new(Body::from(bytes));
        *forwarded.status_mut() = status;
        *forwarded.headers_mut() = response_headers;
        Ok(forwarded)
    }
}
