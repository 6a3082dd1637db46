use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{
    CorsConfig, IpRateLimiter, RateLimitConfig, create_cors_layer, rate_limit, security_headers,
};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Cross-cutting options applied by [`create_router`].
#[derive(Clone, Debug, Default)]
pub struct RouterOptions {
    pub cors: CorsConfig,
    /// `None` disables rate limiting
    pub rate_limit: Option<RateLimitConfig>,
    /// Serve Swagger UI at `/swagger-ui` and the document at `/api-docs/openapi.json`
    pub swagger_ui: bool,
}

/// Starts the Axum server with graceful shutdown on Ctrl+C / SIGTERM.
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(super::shutdown::shutdown_signal())
    .await
    .inspect_err(|e| {
        tracing::error!("Server encountered an error: {:?}", e);
    })?;

    Ok(())
}

/// Creates the application router with common middleware and documentation.
///
/// - API routes nested under `/api`
/// - `root` routes (e.g. `/health`, `/ready`) merged at the top level
/// - Swagger UI when `options.swagger_ui` is set
/// - Per-IP rate limiting, tracing, security headers, CORS, compression
/// - JSON 404 fallback
///
/// Every layer, rate limiting included, wraps both `apis` and `root`.
///
/// # Errors
/// Returns `InvalidInput` when a CORS origin or the rate limit quota is invalid.
pub async fn create_router<T>(
    apis: Router,
    root: Router,
    options: &RouterOptions,
) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let invalid_input = |e: core_config::ConfigError| io::Error::new(io::ErrorKind::InvalidInput, e);

    let cors_layer = create_cors_layer(&options.cors).map_err(invalid_input)?;
    info!(
        "CORS configured with allowed origins: {}",
        options.cors.allowed_origins.join(",")
    );

    let mut router = Router::new();
    if options.swagger_ui {
        router =
            router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()));
    }

    let mut router = router
        .nest("/api", apis)
        .merge(root)
        .fallback(not_found);

    if let Some(config) = &options.rate_limit {
        let limiter = Arc::new(IpRateLimiter::new(config).map_err(invalid_input)?);
        info!(
            permits = config.permits,
            window_secs = config.window_secs,
            "Rate limiting enabled"
        );

        let sweeper = Arc::clone(&limiter);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                sweeper.retain_recent();
            }
        });

        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit));
    }

    let router = router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Server with coordinated shutdown and a bounded cleanup step.
///
/// `cleanup` runs once the shutdown signal arrives (closing pools and the like)
/// and is abandoned after `shutdown_timeout`.
///
/// ```ignore
/// let cleanup = async move {
///     db.close().await.ok();
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let cleanup_signal = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        let mut rx = cleanup_signal.subscribe();
        if !cleanup_signal.is_shutting_down() {
            let _ = rx.recv().await;
        }

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let signal = coordinator.clone();
    let serve_result = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { signal.wait_for_signal().await })
    .await
    .inspect_err(|e| {
        tracing::error!("Server encountered an error: {:?}", e);
    });

    // Server stopped on its own (e.g. an error): still run cleanup
    coordinator.shutdown();
    cleanup_handle.await.ok();

    serve_result
}
