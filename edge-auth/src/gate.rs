//! Request classification and orchestration
//!
//! Each request takes exactly one of these paths, checked in this order:
//!
//! 1. no `Host` header: pass through unchanged (no redirect URI can be derived)
//! 2. path is the callback path: verify state, exchange the code, redirect
//! 3. `OPTIONS`: answer the CORS preflight
//! 4. protected route: forward with a bearer token, or challenge with 401
//! 5. anything else: pass through unchanged

use crate::config::GateConfig;
use crate::cookies::{CookieName, CookieSet, RequestCookies};
use crate::pkce::{AuthorizeParams, PkceChallenge};
use crate::request::Request;
use crate::response::{Challenge, ChallengeBody, CorsHeaders, Outcome, Preflight, Redirect};
use crate::routes::RouteMatcher;
use crate::token::{HttpTokenExchanger, TokenExchanger};
use crate::url_validation::return_path_or_root;
use anyhow::Result;
use http::{HeaderValue, Method};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// The handling path chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    NoHost,
    Callback,
    Preflight,
    Protected,
    Open,
}

/// `code` and `state` from the callback query string
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

impl CallbackParams {
    /// Empty values count as absent; a repeated key keeps its last value
    pub fn parse(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            let value = (!value.is_empty()).then(|| value.into_owned());
            match key.as_ref() {
                "code" => params.code = value,
                "state" => params.state = value,
                _ => {}
            }
        }
        params
    }
}

/// `https://{host}{callback_path}`; never taken from the query string
pub fn redirect_uri(host: &str, callback_path: &str) -> String {
    format!("https://{host}{callback_path}")
}

fn states_match(expected: &str, received: &str) -> bool {
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}

/// Stateless authorization gate
///
/// Holds only read-only configuration; one instance serves any number of
/// concurrent requests.
pub struct RequestGate {
    callback_path: String,
    client_id: String,
    scope: String,
    authorize_endpoint: Url,
    routes: RouteMatcher,
    exchanger: Arc<dyn TokenExchanger>,
}

impl RequestGate {
    pub fn new(config: &GateConfig, exchanger: Arc<dyn TokenExchanger>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            callback_path: config.redirect_path.clone(),
            client_id: config.client_id.clone(),
            scope: config.scopes.to_scope_string(),
            authorize_endpoint: config.authorize_endpoint()?,
            routes: RouteMatcher::new(config.protected_rules.clone()),
            exchanger,
        })
    }

    /// Gate talking to the configured identity provider over HTTP
    pub fn from_config(config: GateConfig) -> Result<Self> {
        let exchanger = Arc::new(HttpTokenExchanger::from_config(&config)?);
        Self::new(&config, exchanger)
    }

    pub fn routes(&self) -> &RouteMatcher {
        &self.routes
    }

    pub fn classify(&self, request: &Request) -> Classification {
        if request.host().is_none() {
            Classification::NoHost
        } else if request.path() == self.callback_path {
            Classification::Callback
        } else if *request.method() == Method::OPTIONS {
            Classification::Preflight
        } else if self.routes.is_protected(request.path(), request.method()) {
            Classification::Protected
        } else {
            Classification::Open
        }
    }

    #[instrument(skip_all, fields(method = %request.method(), path = request.path()))]
    pub async fn handle(&self, request: Request) -> Outcome {
        let classification = self.classify(&request);
        debug!("classified as {classification:?}");
        let host = request.host().map(str::to_owned);
        match (classification, host) {
            (Classification::Callback, Some(host)) => self.handle_callback(&request, &host).await,
            (Classification::Preflight, Some(host)) => Outcome::Preflight(Preflight {
                cors: CorsHeaders::for_host(&host),
            }),
            (Classification::Protected, Some(host)) => self.handle_protected(request, &host),
            (Classification::NoHost, _) => {
                warn!("request without host header, protection skipped");
                Outcome::PassThrough(request)
            }
            _ => Outcome::PassThrough(request),
        }
    }

    async fn handle_callback(&self, request: &Request, host: &str) -> Outcome {
        let cookies = request.cookies();
        let params = CallbackParams::parse(request.query());
        let (code, verifier) = match (
            params.code,
            params.state,
            cookies.pkce_state.as_deref(),
            cookies.pkce_verifier.as_deref(),
        ) {
            (Some(code), Some(state), Some(expected), Some(verifier))
                if states_match(expected, &state) =>
            {
                (code, verifier)
            }
            _ => {
                warn!("callback rejected: missing code, state or pkce cookies, or state mismatch");
                return Outcome::Redirect(Redirect::to_root_clearing_pkce());
            }
        };

        let redirect_uri = redirect_uri(host, &self.callback_path);
        let tokens = match self.exchanger.exchange(&code, verifier, &redirect_uri).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("token exchange failed: {e}");
                return Outcome::Redirect(Redirect::to_root_clearing_pkce());
            }
        };

        let max_age = tokens.session_max_age();
        let mut out = CookieSet::new();
        if let Some(id_token) = tokens.id_token.filter(|t| !t.is_empty()) {
            out.set(CookieName::IdToken, id_token, max_age);
        }
        out.set(CookieName::AccessToken, tokens.access_token, max_age);
        out.delete(CookieName::PkceState);
        out.delete(CookieName::PkceVerifier);
        let return_path = return_path_or_root(cookies.ret.as_deref()).to_string();
        out.delete(CookieName::ReturnPath);

        info!(
            "login completed, session max_age={}s",
            max_age.seconds()
        );
        Outcome::Redirect(Redirect::found(return_path, out))
    }

    fn handle_protected(&self, mut request: Request, host: &str) -> Outcome {
        let cookies = request.cookies();
        if let Some(bearer) = bearer_header(&cookies) {
            request.set_authorization(bearer);
            return Outcome::PassThrough(request);
        }
        Outcome::Challenge(self.challenge(&request, host))
    }

    fn challenge(&self, request: &Request, host: &str) -> Challenge {
        let pkce = PkceChallenge::generate(request.path_and_query(), request.method());
        let redirect_uri = redirect_uri(host, &self.callback_path);
        let login_url = pkce.authorize_url(&AuthorizeParams {
            endpoint: &self.authorize_endpoint,
            client_id: &self.client_id,
            scope: &self.scope,
            redirect_uri: &redirect_uri,
        });
        info!("unauthenticated request to protected route, issuing challenge");
        Challenge {
            body: ChallengeBody::for_login(&login_url, request.accepts_html()),
            login_url,
            cookies: pkce.cookies(),
            cors: CorsHeaders::for_host(host),
        }
    }
}

/// `Bearer {access_token or id_token}`, if a token cookie is present and usable
fn bearer_header(cookies: &RequestCookies) -> Option<HeaderValue> {
    let token = cookies.bearer_token()?;
    match HeaderValue::from_str(&format!("Bearer {token}")) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("token cookie is not a valid header value, treating as unauthenticated");
            None
        }
    }
}
