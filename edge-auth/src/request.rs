use crate::cookies::RequestCookies;
use http::header::{ACCEPT, AUTHORIZATION, HOST};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

/// A request as seen by the gate: method, target and headers
///
/// The body never reaches the gate; the hosting adapter keeps it aside and
/// reattaches it when the request is forwarded.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            inner: http::Request::builder(),
        }
    }

    pub fn from_parts(parts: http::request::Parts) -> Self {
        Self::new(parts.method, parts.uri, parts.headers)
    }

    pub fn into_parts(self) -> (Method, Uri, HeaderMap) {
        (self.method, self.uri, self.headers)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Path plus query string, e.g. `/items?page=2`
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of the `Host` header, if present and non-empty
    pub fn host(&self) -> Option<&str> {
        self.headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    pub fn cookies(&self) -> RequestCookies {
        RequestCookies::from_headers(&self.headers)
    }

    /// Whether the `Accept` header mentions html
    pub fn accepts_html(&self) -> bool {
        self.headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .any(|accept| accept.contains("html"))
    }

    /// Replaces any client-supplied `Authorization` header
    pub(crate) fn set_authorization(&mut self, value: HeaderValue) {
        self.headers.insert(AUTHORIZATION, value);
    }
}

impl<B> From<http::Request<B>> for Request {
    fn from(request: http::Request<B>) -> Self {
        let (parts, _body) = request.into_parts();
        Self::from_parts(parts)
    }
}

/// Builder mirroring `http::request::Builder`, without a body
pub struct RequestBuilder {
    inner: http::request::Builder,
}

impl RequestBuilder {
    pub fn method<T>(self, method: T) -> Self
    where
        Method: TryFrom<T>,
        <Method as TryFrom<T>>::Error: Into<http::Error>,
    {
        Self {
            inner: self.inner.method(method),
        }
    }

    pub fn uri<T>(self, uri: T) -> Self
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        Self {
            inner: self.inner.uri(uri),
        }
    }

    pub fn header<K, V>(self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        Self {
            inner: self.inner.header(key, value),
        }
    }

    pub fn build(self) -> Result<Request, http::Error> {
        Ok(self.inner.body(())?.into())
    }
}
