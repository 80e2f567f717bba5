//! Cookie codec for the gate
//!
//! Every cookie the gate issues is `Secure; HttpOnly; SameSite=Lax; Path=/` and
//! carries an explicit `Max-Age`. The attributes are not configurable: the only
//! way to build an [`IssuedCookie`] is with a [`CookieName`] and a [`MaxAge`].

use crate::error::GateError;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use http::header::SET_COOKIE;
use http::{HeaderMap, HeaderValue};

/// Lifetime of the PKCE session cookies (10 minutes)
pub const PKCE_TTL_SECS: i64 = 600;
/// Lower bound applied to the provider's `expires_in`
pub const SESSION_MIN_SECS: i64 = 60;
/// Upper bound applied to the provider's `expires_in` (6 hours)
pub const SESSION_MAX_SECS: i64 = 6 * 3600;

/// The cookies this gate reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookieName {
    PkceVerifier,
    PkceState,
    ReturnPath,
    IdToken,
    AccessToken,
}

impl CookieName {
    /// The three cookies making up a PKCE session
    pub const PKCE_SESSION: [CookieName; 3] = [
        CookieName::PkceVerifier,
        CookieName::PkceState,
        CookieName::ReturnPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CookieName::PkceVerifier => "pkce_verifier",
            CookieName::PkceState => "pkce_state",
            CookieName::ReturnPath => "ret",
            CookieName::IdToken => "id_token",
            CookieName::AccessToken => "access_token",
        }
    }
}

/// Cookie lifetime in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAge(i64);

impl MaxAge {
    pub const PKCE: MaxAge = MaxAge(PKCE_TTL_SECS);
    pub const EXPIRED: MaxAge = MaxAge(0);

    /// Lifetime of token cookies: `expires_in` clamped to [60s, 6h]
    pub fn session(expires_in_secs: i64) -> Self {
        MaxAge(expires_in_secs.clamp(SESSION_MIN_SECS, SESSION_MAX_SECS))
    }

    pub fn seconds(self) -> i64 {
        self.0
    }
}

/// Cookies the gate cares about, read from the request's `Cookie` header(s)
///
/// Values are percent-decoded. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCookies {
    pub pkce_verifier: Option<String>,
    pub pkce_state: Option<String>,
    pub ret: Option<String>,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

impl RequestCookies {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let jar = CookieJar::from_headers(headers);
        let get = |name: CookieName| {
            jar.get(name.as_str())
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            pkce_verifier: get(CookieName::PkceVerifier),
            pkce_state: get(CookieName::PkceState),
            ret: get(CookieName::ReturnPath),
            id_token: get(CookieName::IdToken),
            access_token: get(CookieName::AccessToken),
        }
    }

    /// Token to forward as bearer: the access token, else the id token
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or(self.id_token.as_deref())
    }
}

/// A cookie the gate emits in a `Set-Cookie` header
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCookie {
    name: CookieName,
    value: String,
    max_age: MaxAge,
}

impl IssuedCookie {
    pub fn new(name: CookieName, value: impl Into<String>, max_age: MaxAge) -> Self {
        Self {
            name,
            value: value.into(),
            max_age,
        }
    }

    /// An empty, already expired cookie that makes the browser drop `name`
    pub fn deletion(name: CookieName) -> Self {
        Self::new(name, "", MaxAge::EXPIRED)
    }

    pub fn name(&self) -> CookieName {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn max_age(&self) -> MaxAge {
        self.max_age
    }

    pub fn is_deletion(&self) -> bool {
        self.max_age == MaxAge::EXPIRED
    }

    pub fn to_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.as_str(), self.value.clone()))
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(self.max_age.seconds()))
            .build()
    }

    /// `Set-Cookie` header value with the value percent-encoded
    pub fn to_header_value(&self) -> Result<HeaderValue, GateError> {
        let rendered = self.to_cookie().encoded().to_string();
        Ok(HeaderValue::from_str(&rendered)?)
    }
}

impl std::fmt::Debug for IssuedCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // cookie values are secrets (verifier, tokens)
        f.debug_struct("IssuedCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}

/// Ordered set of cookie mutations attached to a response
///
/// At most one mutation per cookie name; a later insert for the same name
/// replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: Vec<IssuedCookie>,
}

impl CookieSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deletions for the three PKCE session cookies
    pub fn pkce_cleared() -> Self {
        let mut set = Self::new();
        for name in CookieName::PKCE_SESSION {
            set.delete(name);
        }
        set
    }

    pub fn insert(&mut self, cookie: IssuedCookie) {
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    pub fn set(&mut self, name: CookieName, value: impl Into<String>, max_age: MaxAge) {
        self.insert(IssuedCookie::new(name, value, max_age));
    }

    pub fn delete(&mut self, name: CookieName) {
        self.insert(IssuedCookie::deletion(name));
    }

    pub fn get(&self, name: CookieName) -> Option<&IssuedCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IssuedCookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Appends one `Set-Cookie` header per cookie
    pub fn append_to(&self, headers: &mut HeaderMap) -> Result<(), GateError> {
        for cookie in &self.cookies {
            headers.append(SET_COOKIE, cookie.to_header_value()?);
        }
        Ok(())
    }
}
