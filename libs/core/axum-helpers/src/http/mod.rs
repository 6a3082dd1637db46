//! HTTP middleware module.
//!
//! - CORS configuration
//! - Per-client rate limiting
//! - Security headers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{create_cors_layer, security_headers, CorsConfig};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(create_cors_layer(&CorsConfig::default())?);
//! ```

pub mod cors;
pub mod rate_limit;
pub mod security;

pub use cors::{CorsConfig, create_cors_layer};
pub use rate_limit::{IpRateLimiter, RateLimitConfig, rate_limit};
pub use security::security_headers;
