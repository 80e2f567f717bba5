//! Stateless OAuth2 authorization gate for edge request paths
//!
//! This crate decides, for every request entering the edge, whether it is:
//!
//! - **a callback** from the identity provider (code + state are checked against
//!   the PKCE cookies, the code is exchanged, token cookies are issued)
//! - **a CORS preflight** (answered directly with 204)
//! - **a protected request** with or without token cookies (forwarded with a
//!   bearer token, or challenged with 401 + login hint)
//! - **an open request** (forwarded untouched)
//!
//! No state is kept between invocations: the PKCE session lives in three
//! short-lived cookies and the token set in two more.
//!
//! # Example
//!
//! ```rust,no_run
//! use edge_auth::config::GateConfig;
//! use edge_auth::gate::RequestGate;
//! use edge_auth::request::Request;
//! use edge_auth::response::Outcome;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GateConfig::from_json(
//!     r#"{
//!         "identity_provider_domain": "auth.example.com",
//!         "client_id": "my-client",
//!         "protected_rules": [{"prefix": "/api/*"}]
//!     }"#,
//! )?;
//! let gate = RequestGate::from_config(config)?;
//!
//! let request = Request::builder()
//!     .method(http::Method::GET)
//!     .uri("/api/items")
//!     .header(http::header::HOST, "app.example.com")
//!     .build()?;
//!
//! match gate.handle(request).await {
//!     Outcome::PassThrough(forwarded) => println!("forward {}", forwarded.uri()),
//!     Outcome::Challenge(challenge) => println!("401, login at {}", challenge.login_url),
//!     Outcome::Redirect(redirect) => println!("302 to {}", redirect.location),
//!     Outcome::Preflight(_) => println!("204"),
//! }
//! # Ok(())
//! # }
//! ```

/// Gate configuration (identity provider, client, protection rules)
pub mod config;

/// Cookie parsing and security-attributed Set-Cookie rendering
pub mod cookies;

/// Error types
pub mod error;

/// Request classification and orchestration
pub mod gate;

/// PKCE verifier/state generation and authorize URL construction
pub mod pkce;

/// Incoming request representation
pub mod request;

/// Outcome types and their HTTP rendering
pub mod response;

/// Protected route matching
pub mod routes;

/// Authorization code to token set exchange
pub mod token;

/// URL validation utilities for authentication flows
pub mod url_validation;
