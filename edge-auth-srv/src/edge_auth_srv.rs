use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use edge_auth::config::GateConfig;
use edge_auth::gate::RequestGate;
use edge_auth_srv::config::HeaderForwardingConfig;
use edge_auth_srv::forward::OriginForwarder;
use edge_auth_srv::proxy::{AppState, DEFAULT_MAX_BODY_BYTES, router};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[clap(name = "edge-auth-srv")]
#[clap(about = "OAuth2 + PKCE gate in front of an origin", version)]
struct Cli {
    #[clap(long, default_value = "0.0.0.0:3000")]
    listen_endpoint: SocketAddr,

    /// Base URL requests are forwarded to
    #[clap(long, env = "EDGE_AUTH_ORIGIN")]
    origin: Url,

    /// Gate configuration file; EDGE_AUTH_CONFIG is read when absent
    #[clap(long)]
    config: Option<PathBuf>,

    #[clap(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    #[clap(long, default_value_t = 30)]
    origin_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Cli::parse();

    let gate_config = match &args.config {
        Some(path) => GateConfig::from_file(path)?,
        None => GateConfig::from_env()?,
    };
    info!(
        "protecting {} rule(s), callback path {}",
        gate_config.protected_rules.len(),
        gate_config.redirect_path
    );
    let gate = RequestGate::from_config(gate_config).context("building request gate")?;
    let forwarder = OriginForwarder::new(
        args.origin.clone(),
        HeaderForwardingConfig::from_env()?,
        Duration::from_secs(args.origin_timeout_secs),
    )?;
    let state = AppState::new(gate, forwarder).with_max_body_bytes(args.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(args.listen_endpoint).await?;
    info!(
        "Server running on {}, forwarding to {}",
        args.listen_endpoint, args.origin
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}
