//! The four outcomes the gate can produce and their HTTP rendering

use crate::cookies::CookieSet;
use crate::error::GateError;
use crate::request::Request;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, CACHE_CONTROL, CONTENT_TYPE,
    LOCATION, VARY,
};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use url::Url;

/// Response header carrying the login URL on a 401 challenge
pub const X_AUTH_REDIRECT: HeaderName = HeaderName::from_static("x-auth-redirect");

pub const CORS_ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "*,Authorization,Content-Type";
pub const CORS_EXPOSE_HEADERS: &str = "X-Auth-Redirect,Set-Cookie";

/// CORS headers for responses synthesized by the gate
///
/// The allowed origin is always the request's own host over https.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsHeaders {
    allow_origin: String,
}

impl CorsHeaders {
    pub fn for_host(host: &str) -> Self {
        Self {
            allow_origin: format!("https://{host}"),
        }
    }

    pub fn allow_origin(&self) -> &str {
        &self.allow_origin
    }

    fn write(&self, headers: &mut HeaderMap) -> Result<(), GateError> {
        headers.insert(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_str(&self.allow_origin)?,
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(VARY, HeaderValue::from_static("Origin"));
        Ok(())
    }
}

fn build_response(
    status: StatusCode,
    headers: HeaderMap,
    body: String,
) -> Result<http::Response<String>, GateError> {
    let mut response = http::Response::builder().status(status).body(body)?;
    *response.headers_mut() = headers;
    Ok(response)
}

/// 302 to a same-origin path, with cookie mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub cookies: CookieSet,
    pub status: StatusCode,
}

impl Redirect {
    pub fn found(location: impl Into<String>, cookies: CookieSet) -> Self {
        Self {
            location: location.into(),
            cookies,
            status: StatusCode::FOUND,
        }
    }

    /// Redirect to `/` clearing the whole PKCE session
    pub fn to_root_clearing_pkce() -> Self {
        Self::found("/", CookieSet::pkce_cleared())
    }

    pub fn to_response(&self) -> Result<http::Response<String>, GateError> {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_str(&self.location)?);
        self.cookies.append_to(&mut headers)?;
        build_response(self.status, headers, String::new())
    }
}

/// Body of a 401 challenge, chosen from the request's `Accept` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeBody {
    /// Page that navigates to the login URL by itself
    Html(String),
    /// `{"error":"unauthorized","login":"<url>"}`
    Json(serde_json::Value),
}

impl ChallengeBody {
    pub fn for_login(login_url: &Url, accepts_html: bool) -> Self {
        if accepts_html {
            // a JSON string literal is a valid JS string literal
            let target = serde_json::Value::String(login_url.to_string());
            ChallengeBody::Html(format!(
                "<html><body><script>window.location.assign({target})</script></body></html>"
            ))
        } else {
            ChallengeBody::Json(serde_json::json!({
                "error": "unauthorized",
                "login": login_url.as_str(),
            }))
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ChallengeBody::Html(_) => "text/html",
            ChallengeBody::Json(_) => "application/json",
        }
    }

    pub fn render(&self) -> String {
        match self {
            ChallengeBody::Html(html) => html.clone(),
            ChallengeBody::Json(json) => json.to_string(),
        }
    }
}

/// 401 carrying a fresh PKCE session and the login URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub login_url: Url,
    pub cookies: CookieSet,
    pub cors: CorsHeaders,
    pub body: ChallengeBody,
}

impl Challenge {
    pub fn to_response(&self) -> Result<http::Response<String>, GateError> {
        let mut headers = HeaderMap::new();
        self.cookies.append_to(&mut headers)?;
        self.cors.write(&mut headers)?;
        headers.insert(
            ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(CORS_EXPOSE_HEADERS),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(self.body.content_type()),
        );
        headers.insert(X_AUTH_REDIRECT, HeaderValue::from_str(self.login_url.as_str())?);
        build_response(StatusCode::UNAUTHORIZED, headers, self.body.render())
    }
}

/// 204 answer to a CORS preflight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preflight {
    pub cors: CorsHeaders,
}

impl Preflight {
    pub fn to_response(&self) -> Result<http::Response<String>, GateError> {
        let mut headers = HeaderMap::new();
        self.cors.write(&mut headers)?;
        build_response(StatusCode::NO_CONTENT, headers, String::new())
    }
}

/// Result of running one request through the gate
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Forward to the origin, possibly with an injected `Authorization` header
    PassThrough(Request),
    Redirect(Redirect),
    Challenge(Challenge),
    Preflight(Preflight),
}

/// What the hosting adapter has to do with an outcome
#[derive(Debug)]
pub enum Rendered {
    Forward(Request),
    Respond(http::Response<String>),
}

impl Outcome {
    /// Cookie mutations carried by the outcome, if any
    pub fn cookies(&self) -> Option<&CookieSet> {
        match self {
            Outcome::Redirect(r) => Some(&r.cookies),
            Outcome::Challenge(c) => Some(&c.cookies),
            Outcome::PassThrough(_) | Outcome::Preflight(_) => None,
        }
    }

    pub fn render(self) -> Result<Rendered, GateError> {
        Ok(match self {
            Outcome::PassThrough(request) => Rendered::Forward(request),
            Outcome::Redirect(redirect) => Rendered::Respond(redirect.to_response()?),
            Outcome::Challenge(challenge) => Rendered::Respond(challenge.to_response()?),
            Outcome::Preflight(preflight) => Rendered::Respond(preflight.to_response()?),
        })
    }
}
