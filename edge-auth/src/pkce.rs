//! PKCE session generation (RFC 7636, S256 method)
//!
//! A challenge is generated for every protected request that arrives without
//! token cookies. Its verifier, state and return path travel to the browser in
//! three cookies and come back on the callback; nothing is stored here.

use crate::cookies::{CookieName, CookieSet, MaxAge};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use http::Method;
use rand::RngCore;
use sha2::{Digest, Sha256};
use url::Url;

/// Random bytes behind the code verifier (43 base64url chars)
pub const VERIFIER_BYTES: usize = 32;
/// Random bytes behind the state token (22 base64url chars)
pub const STATE_BYTES: usize = 16;

fn random_token<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// base64url(SHA-256(verifier))
pub fn code_challenge_s256(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Where to send the browser once login completes
///
/// Only GET requests return to where they came from. Redirecting back to a
/// POST target would replay it as a GET, so every other method returns to `/`
/// and replaying the action is left to the client.
pub fn return_path_for(path_and_query: &str, method: &Method) -> String {
    if *method == Method::GET {
        path_and_query.to_string()
    } else {
        "/".to_string()
    }
}

/// Parameters of the authorize redirect that do not change per request
#[derive(Debug, Clone)]
pub struct AuthorizeParams<'a> {
    pub endpoint: &'a Url,
    pub client_id: &'a str,
    pub scope: &'a str,
    pub redirect_uri: &'a str,
}

/// A freshly generated PKCE session
#[derive(Clone)]
pub struct PkceChallenge {
    verifier: String,
    state: String,
    code_challenge: String,
    return_path: String,
}

impl PkceChallenge {
    pub fn generate(path_and_query: &str, method: &Method) -> Self {
        Self::from_parts(
            random_token::<VERIFIER_BYTES>(),
            random_token::<STATE_BYTES>(),
            return_path_for(path_and_query, method),
        )
    }

    /// Builds a challenge from known values, deriving the code challenge
    pub fn from_parts(verifier: String, state: String, return_path: String) -> Self {
        let code_challenge = code_challenge_s256(&verifier);
        Self {
            verifier,
            state,
            code_challenge,
            return_path,
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn code_challenge(&self) -> &str {
        &self.code_challenge
    }

    pub fn return_path(&self) -> &str {
        &self.return_path
    }

    /// `pkce_verifier`, `pkce_state` and `ret`, each with a 10 minute lifetime
    pub fn cookies(&self) -> CookieSet {
        let mut cookies = CookieSet::new();
        cookies.set(CookieName::PkceVerifier, self.verifier.clone(), MaxAge::PKCE);
        cookies.set(CookieName::PkceState, self.state.clone(), MaxAge::PKCE);
        cookies.set(CookieName::ReturnPath, self.return_path.clone(), MaxAge::PKCE);
        cookies
    }

    /// The identity provider's authorize URL for this session
    pub fn authorize_url(&self, params: &AuthorizeParams<'_>) -> Url {
        let mut url = params.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", params.client_id)
            .append_pair("redirect_uri", params.redirect_uri)
            .append_pair("code_challenge", &self.code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("scope", params.scope)
            .append_pair("state", &self.state);
        url
    }
}

impl std::fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("verifier", &"<redacted>")
            .field("state", &self.state)
            .field("code_challenge", &self.code_challenge)
            .field("return_path", &self.return_path)
            .finish()
    }
}
