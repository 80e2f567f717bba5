use crate::routes::ProtectedRule;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable holding the JSON configuration document
pub const CONFIG_ENV_VAR: &str = "EDGE_AUTH_CONFIG";

const DEFAULT_SCOPES: &str = "openid email profile";
const DEFAULT_REDIRECT_PATH: &str = "/callback";
const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 10;

/// Scopes can be given either as one space separated string or as a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Scopes {
    Joined(String),
    List(Vec<String>),
}

impl Scopes {
    /// Space separated form used in the authorize URL
    pub fn to_scope_string(&self) -> String {
        match self {
            Scopes::Joined(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
            Scopes::List(v) => v
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Scopes::Joined(DEFAULT_SCOPES.to_string())
    }
}

fn default_redirect_path() -> String {
    DEFAULT_REDIRECT_PATH.to_string()
}

fn default_exchange_timeout_secs() -> u64 {
    DEFAULT_EXCHANGE_TIMEOUT_SECS
}

/// Gate configuration, read once at startup and passed to `RequestGate`
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Identity provider domain (`auth.example.com`) or base URL
    #[serde(alias = "COGNITO_DOMAIN", alias = "identityProviderDomain")]
    pub identity_provider_domain: String,
    /// Public client id registered with the identity provider
    #[serde(alias = "CLIENT_ID", alias = "clientId")]
    pub client_id: String,
    #[serde(default, alias = "SCOPES")]
    pub scopes: Scopes,
    /// Path of the OAuth callback on this host
    #[serde(
        default = "default_redirect_path",
        alias = "REDIRECT_PATH",
        alias = "redirectPath"
    )]
    pub redirect_path: String,
    /// Ordered protection rules; none means every route is open
    #[serde(default, alias = "PROTECTED_RULES", alias = "protectedRules")]
    pub protected_rules: Vec<ProtectedRule>,
    #[serde(default = "default_exchange_timeout_secs")]
    pub exchange_timeout_secs: u64,
}

impl GateConfig {
    pub fn new(identity_provider_domain: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            identity_provider_domain: identity_provider_domain.into(),
            client_id: client_id.into(),
            scopes: Scopes::default(),
            redirect_path: default_redirect_path(),
            protected_rules: Vec::new(),
            exchange_timeout_secs: DEFAULT_EXCHANGE_TIMEOUT_SECS,
        }
    }

    pub fn with_protected_rules(mut self, rules: Vec<ProtectedRule>) -> Self {
        self.protected_rules = rules;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: GateConfig =
            serde_json::from_str(json).context("Failed to parse gate configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the `EDGE_AUTH_CONFIG` environment variable
    pub fn from_env() -> Result<Self> {
        let json = std::env::var(CONFIG_ENV_VAR)
            .map_err(|_| anyhow!("{CONFIG_ENV_VAR} environment variable not set"))?;
        Self::from_json(&json).with_context(|| format!("Failed to load {CONFIG_ENV_VAR}"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.identity_provider_domain.trim().is_empty() {
            bail!("identity_provider_domain must not be empty");
        }
        if self.client_id.trim().is_empty() {
            bail!("client_id must not be empty");
        }
        if !self.redirect_path.starts_with('/') {
            bail!(
                "redirect_path must start with '/', got {:?}",
                self.redirect_path
            );
        }
        if let Some(rule) = self
            .protected_rules
            .iter()
            .find(|r| !r.prefix.starts_with('/'))
        {
            bail!("protected rule prefix must start with '/', got {:?}", rule.prefix);
        }
        self.provider_base_url()?;
        Ok(())
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_secs)
    }

    /// Base URL of the identity provider, https implied for bare domains
    fn provider_base_url(&self) -> Result<String> {
        let domain = self.identity_provider_domain.trim().trim_end_matches('/');
        let base = if domain.starts_with("https://") || domain.starts_with("http://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        };
        Url::parse(&base).with_context(|| format!("Invalid identity provider domain {domain:?}"))?;
        Ok(base)
    }

    /// `{base}/login`
    pub fn authorize_endpoint(&self) -> Result<Url> {
        let base = self.provider_base_url()?;
        Ok(Url::parse(&format!("{base}/login"))?)
    }

    /// `{base}/oauth2/token`
    pub fn token_endpoint(&self) -> Result<Url> {
        let base = self.provider_base_url()?;
        Ok(Url::parse(&format!("{base}/oauth2/token"))?)
    }
}
