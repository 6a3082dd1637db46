//! Server infrastructure module.
//!
//! - Router setup with middleware and OpenAPI documentation
//! - Health and readiness helpers
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_router, create_production_app, health_router, RouterOptions};
//!
//! let root = health_router(core_config::app_info!());
//! let app = create_router::<ApiDoc>(api_routes, root, &RouterOptions::default()).await?;
//!
//! create_production_app(app, &server_config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{RouterOptions, create_app, create_production_app, create_router};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
