use axum::Router;
use domain_tasks::handlers;

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest("/tasks", handlers::router(state.tasks.clone()))
}

/// Creates a router with the /ready endpoint that performs actual health checks.
///
/// This router has state applied and is passed to `create_router` as a root
/// route so the shared middleware wraps it.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
