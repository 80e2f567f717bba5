//! edge-auth-srv : reverse proxy hosting the edge-auth gate

/// Header filtering between client and origin
pub mod config;

pub mod error;

/// Forwarding to the origin
pub mod forward;

/// Request logging middleware
pub mod observability;

/// Router and request handler
pub mod proxy;
