use crate::config::GateConfig;
use crate::cookies::MaxAge;
use crate::error::ExchangeError;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Lifetime assumed when the provider omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Longest provider error body kept in `ExchangeError::Status`
const ERROR_BODY_EXCERPT: usize = 256;

/// Token endpoint response (the fields the gate uses)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSet {
    #[serde(default)]
    pub id_token: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenSet {
    /// Cookie lifetime for the tokens, bounded to [60s, 6h]
    pub fn session_max_age(&self) -> MaxAge {
        MaxAge::session(self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("id_token", &self.id_token.as_ref().map(|_| "<sensitive token>"))
            .field("access_token", &"<sensitive token>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Exchanges an authorization code for a token set
///
/// Called at most once per callback. Implementations must not retry: the code
/// is single use, so a second attempt cannot succeed.
#[async_trait::async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, ExchangeError>;
}

/// Create HTTP client for the token endpoint
fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow!("Failed to create HTTP client: {e:?}"))
}

/// `TokenExchanger` posting to the identity provider's `/oauth2/token`
pub struct HttpTokenExchanger {
    http_client: reqwest::Client,
    token_endpoint: Url,
    client_id: String,
}

impl HttpTokenExchanger {
    pub fn new(token_endpoint: Url, client_id: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: create_http_client(timeout)?,
            token_endpoint,
            client_id,
        })
    }

    pub fn from_config(config: &GateConfig) -> Result<Self> {
        Self::new(
            config.token_endpoint()?,
            config.client_id.clone(),
            config.exchange_timeout(),
        )
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }
}

#[async_trait::async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, ExchangeError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", verifier),
        ];
        let response = self
            .http_client
            .post(self.token_endpoint.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        debug!("token endpoint responded status={status}");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status {
                status,
                body: body.chars().take(ERROR_BODY_EXCERPT).collect(),
            });
        }

        let payload = response.bytes().await?;
        Ok(serde_json::from_slice(&payload)?)
    }
}
